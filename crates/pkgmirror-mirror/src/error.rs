use std::io;
use std::path::PathBuf;

use pkgmirror_fetch::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("failed to fetch catalog {url}: {source}")]
    Catalog {
        url:    String,
        #[source]
        source: FetchError,
    },

    #[error("catalog {url} is not valid UTF-8")]
    CatalogEncoding { url: String },

    #[error("failed to fetch metadata {url}: {source}")]
    Metadata {
        url:    String,
        #[source]
        source: FetchError,
    },

    #[error("invalid metadata document from {url}: {source}")]
    InvalidMetadata {
        url:    String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to download {url}: {source}")]
    Download {
        url:    String,
        #[source]
        source: FetchError,
    },

    #[error("failed to create alias {alias} for {package}: {source}")]
    AliasCreationFailed {
        package: String,
        alias:   String,
        #[source]
        source:  pkgmirror_fs::Error,
    },

    #[error("package directory {path} is an alias of another entry")]
    AliasedDirectory { package: String, path: PathBuf },

    #[error("invalid package name {0:?}")]
    InvalidName(String),

    #[error("index file {path}: {source}")]
    Index {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} queue closed while work was pending")]
    QueueClosed(&'static str),

    #[error(transparent)]
    Fs(#[from] pkgmirror_fs::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, MirrorError>;
