use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to link {link} -> {target}: {source}")]
    Symlink {
        link:   PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path has no parent directory: {0}")]
    NoParent(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
