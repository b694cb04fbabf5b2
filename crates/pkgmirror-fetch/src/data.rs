//! Data layer: immutable option and outcome types.

use std::path::PathBuf;
use std::time::Duration;

/// Per-request deadlines; each bounds one whole request including the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Startup catalog listing; defaults to the download deadline.
    pub catalog:  Duration,
    pub metadata: Duration,
    pub download: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            catalog:  Duration::from_secs(300),
            metadata: Duration::from_secs(30),
            download: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Extra attempts after a failed connection; other failures are never retried.
    pub connect_retries: u32,
    pub retry_backoff:   Duration,
    pub user_agent:      String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_retries: 1,
            retry_backoff:   Duration::from_millis(100),
            user_agent:      concat!("pkgmirror/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Result of comparing downloaded bytes with the declared checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Mismatch { expected: String, actual: String },
    /// No checksum was declared.
    Unchecked,
}

impl Verification {
    pub fn is_mismatch(&self) -> bool { matches!(self, Verification::Mismatch { .. }) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub path:         PathBuf,
    pub bytes:        u64,
    pub verification: Verification,
}
