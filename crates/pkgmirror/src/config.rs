//! Layered settings: defaults, then `pkgmirror.toml` (or `--config`), then
//! `PKGMIRROR_*` environment variables. Command-line flags are applied last by
//! the caller.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pkgmirror_fetch::{ClientOptions, Timeouts};
use pkgmirror_mirror::{FileFilter, MirrorOptions};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "pkgmirror.toml";
pub const ENV_PREFIX: &str = "PKGMIRROR_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub root:                  PathBuf,
    pub catalog_url:           String,
    pub metadata_url:          String,
    pub reconcilers:           usize,
    pub fetchers:              usize,
    pub queue_capacity:        usize,
    pub catalog_timeout_secs:  u64,
    pub metadata_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub connect_retries:       u32,
    pub checksum_retries:      u32,
    pub extensions:            Vec<String>,
    pub exclude_platforms:     bool,
    pub bind:                  SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        let mirror = MirrorOptions::default();
        let filter = FileFilter::default();
        Self {
            root:                  mirror.root,
            catalog_url:           mirror.catalog_url,
            metadata_url:          mirror.metadata_url,
            reconcilers:           mirror.reconcilers,
            fetchers:              mirror.fetchers,
            queue_capacity:        mirror.queue_capacity,
            catalog_timeout_secs:  mirror.timeouts.catalog.as_secs(),
            metadata_timeout_secs: mirror.timeouts.metadata.as_secs(),
            download_timeout_secs: mirror.timeouts.download.as_secs(),
            connect_retries:       ClientOptions::default().connect_retries,
            checksum_retries:      mirror.checksum_retries,
            extensions:            filter.extensions().map(str::to_string).collect(),
            exclude_platforms:     true,
            bind:                  SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

impl Config {
    /// The provider chain; `path` replaces the default config file name.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "loading configuration");
        }
        Self::figment(path).extract()
    }

    pub fn mirror_options(&self) -> MirrorOptions {
        MirrorOptions {
            root:             self.root.clone(),
            catalog_url:      self.catalog_url.clone(),
            metadata_url:     self.metadata_url.clone(),
            reconcilers:      self.reconcilers,
            fetchers:         self.fetchers,
            queue_capacity:   self.queue_capacity,
            timeouts:         Timeouts {
                catalog:  Duration::from_secs(self.catalog_timeout_secs),
                metadata: Duration::from_secs(self.metadata_timeout_secs),
                download: Duration::from_secs(self.download_timeout_secs),
            },
            checksum_retries: self.checksum_retries,
            filter:           FileFilter::new(self.extensions.iter().cloned(), self.exclude_platforms),
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            connect_retries: self.connect_retries,
            ..ClientOptions::default()
        }
    }

    pub fn index_path(&self) -> PathBuf { self.root.join("index") }
}
