use std::path::PathBuf;

use pkgmirror_fetch::Timeouts;

use crate::filter::FileFilter;

pub const DEFAULT_CATALOG_URL: &str = "https://pypi.org/simple/";
pub const DEFAULT_METADATA_URL: &str = "https://pypi.org/pypi/{name}/json";

#[derive(Debug, Clone)]
pub struct MirrorOptions {
    pub root:             PathBuf,
    pub catalog_url:      String,
    /// URL template; `{name}` is replaced with the canonical package name.
    pub metadata_url:     String,
    pub reconcilers:      usize,
    pub fetchers:         usize,
    /// Capacity of each of the package, file and results queues.
    pub queue_capacity:   usize,
    pub timeouts:         Timeouts,
    /// Extra downloads attempted after a checksum mismatch.
    pub checksum_retries: u32,
    pub filter:           FileFilter,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            root:             PathBuf::from("."),
            catalog_url:      DEFAULT_CATALOG_URL.to_string(),
            metadata_url:     DEFAULT_METADATA_URL.to_string(),
            reconcilers:      50,
            fetchers:         50,
            queue_capacity:   10,
            timeouts:         Timeouts::default(),
            checksum_retries: 0,
            filter:           FileFilter::default(),
        }
    }
}

impl MirrorOptions {
    pub fn metadata_url_for(&self, canonical: &str) -> String {
        self.metadata_url.replace("{name}", canonical)
    }
}
