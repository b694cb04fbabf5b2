//! File fetcher stage: one artifact per job, verified on the way in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_channel::Receiver;
use pkgmirror_fetch::{Fetcher, HttpClient, Verification};

use crate::error::{MirrorError, Result};
use crate::layout::MirrorLayout;
use crate::metadata::ReleaseFile;
use crate::options::MirrorOptions;

/// A release file and where it lands in the mirror tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub file:        ReleaseFile,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Already on disk with the declared size; nothing was downloaded.
    Present,
    Verified,
    /// Downloaded, but no checksum was declared.
    Unverified,
    /// Downloaded and kept although the digest differs.
    Mismatch { expected: String, actual: String },
}

/// One fetcher worker.
pub struct FileFetcher<C: HttpClient> {
    fetcher:          Fetcher<Arc<C>>,
    timeout:          Duration,
    checksum_retries: u32,
}

impl<C: HttpClient> FileFetcher<C> {
    pub fn new(client: Arc<C>, layout: &MirrorLayout, options: &MirrorOptions) -> Self {
        Self {
            fetcher:          Fetcher::new(client, layout.staging_dir()),
            timeout:          options.timeouts.download,
            checksum_retries: options.checksum_retries,
        }
    }

    /// Drain the file queue until it is closed.
    pub async fn run(self, queue: Receiver<FileJob>) {
        while let Ok(job) = queue.recv().await {
            if let Err(e) = self.download(&job).await {
                tracing::error!(
                    package = %job.file.package,
                    filename = %job.file.filename,
                    error = %e,
                    "download failed"
                );
            }
        }
    }

    /// Bring one artifact onto disk.
    ///
    /// The size-only check is the idempotence guard: a file whose length
    /// matches the declared size is never fetched again.
    pub async fn download(&self, job: &FileJob) -> Result<FetchOutcome> {
        let file = &job.file;
        if pkgmirror_fs::file_len(&job.destination) == Some(file.size) {
            tracing::trace!(package = %file.package, filename = %file.filename, "already present");
            return Ok(FetchOutcome::Present);
        }

        let mut attempt = 0;
        loop {
            let download = self
                .fetcher
                .fetch(&file.url, &job.destination, file.checksum.as_ref(), self.timeout)
                .await
                .map_err(|source| MirrorError::Download {
                    url: file.url.clone(),
                    source,
                })?;

            match download.verification {
                Verification::Verified => {
                    tracing::info!(package = %file.package, filename = %file.filename, bytes = download.bytes, "Downloaded: Ok");
                    return Ok(FetchOutcome::Verified);
                }
                Verification::Unchecked => {
                    tracing::info!(package = %file.package, filename = %file.filename, bytes = download.bytes, "Downloaded: unverified");
                    return Ok(FetchOutcome::Unverified);
                }
                Verification::Mismatch { expected, actual } if attempt >= self.checksum_retries => {
                    tracing::warn!(
                        package = %file.package,
                        filename = %file.filename,
                        url = %file.url,
                        expected,
                        actual,
                        "Downloaded: checksum failed"
                    );
                    return Ok(FetchOutcome::Mismatch { expected, actual });
                }
                Verification::Mismatch { .. } => {
                    attempt += 1;
                    tracing::debug!(filename = %file.filename, attempt, "checksum mismatch, downloading again");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::PackageName;
    use bytes::Bytes;
    use pkgmirror_fetch::{BoxStream, FetchError};
    use pkgmirror_verify::Checksum;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Serves the same body for every URL and counts requests.
    struct FixedBody {
        body: &'static [u8],
        hits: AtomicUsize,
    }

    impl HttpClient for FixedBody {
        async fn get(&self, _url: &str, _timeout: Duration) -> pkgmirror_fetch::Result<Bytes> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(self.body))
        }

        async fn stream(
            &self,
            _url: &str,
            _timeout: Duration,
        ) -> pkgmirror_fetch::Result<BoxStream<'static, pkgmirror_fetch::Result<Bytes>>> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            let chunk: pkgmirror_fetch::Result<Bytes> = Ok(Bytes::from_static(self.body));
            Ok(Box::pin(futures_util::stream::iter([chunk])))
        }
    }

    struct Failing;

    impl HttpClient for Failing {
        async fn get(&self, url: &str, _timeout: Duration) -> pkgmirror_fetch::Result<Bytes> {
            Err(FetchError::Status { url: url.to_string(), status: 503 })
        }

        async fn stream(
            &self,
            url: &str,
            _timeout: Duration,
        ) -> pkgmirror_fetch::Result<BoxStream<'static, pkgmirror_fetch::Result<Bytes>>> {
            Err(FetchError::Status { url: url.to_string(), status: 503 })
        }
    }

    fn job(layout: &MirrorLayout, size: u64, checksum: Option<Checksum>) -> FileJob {
        let package = PackageName::new("Foo").unwrap();
        FileJob {
            destination: layout.artifact_path("Foo", "foo-1.0.tar.gz"),
            file:        ReleaseFile {
                package,
                version: "1.0".into(),
                filename: "foo-1.0.tar.gz".into(),
                url: "https://files.example/foo-1.0.tar.gz".into(),
                size,
                checksum,
            },
        }
    }

    fn setup() -> (tempfile::TempDir, MirrorLayout) {
        let dir = tempdir().unwrap();
        let layout = MirrorLayout::new(dir.path());
        layout.bootstrap().unwrap();
        pkgmirror_fs::ensure_dir(layout.package_dir("Foo")).unwrap();
        (dir, layout)
    }

    fn fetcher<C: HttpClient>(client: C, layout: &MirrorLayout, retries: u32) -> FileFetcher<C> {
        let options = MirrorOptions {
            checksum_retries: retries,
            ..MirrorOptions::default()
        };
        FileFetcher::new(Arc::new(client), layout, &options)
    }

    #[tokio::test]
    async fn test_verified_download() {
        let (_dir, layout) = setup();
        let client = FixedBody { body: b"hello world", hits: AtomicUsize::new(0) };
        let fetcher = fetcher(client, &layout, 0);
        let job = job(&layout, 11, Some(Checksum::md5("5eb63bbbe01eeed093cb22bb8f5acdc3").unwrap()));

        assert_eq!(fetcher.download(&job).await.unwrap(), FetchOutcome::Verified);
        assert_eq!(std::fs::read(&job.destination).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_matching_size_short_circuits() {
        let (_dir, layout) = setup();
        let client = FixedBody { body: b"new", hits: AtomicUsize::new(0) };
        let fetcher = fetcher(client, &layout, 0);
        let job = job(&layout, 3, None);
        std::fs::write(&job.destination, b"old").unwrap();

        assert_eq!(fetcher.download(&job).await.unwrap(), FetchOutcome::Present);
        assert_eq!(fetcher.fetcher.client().hits.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read(&job.destination).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_size_change_overwrites() {
        let (_dir, layout) = setup();
        let client = FixedBody { body: b"hello world", hits: AtomicUsize::new(0) };
        let fetcher = fetcher(client, &layout, 0);
        let job = job(&layout, 11, None);
        std::fs::write(&job.destination, b"stale").unwrap();

        assert_eq!(fetcher.download(&job).await.unwrap(), FetchOutcome::Unverified);
        assert_eq!(std::fs::read(&job.destination).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_mismatch_is_kept_without_retry() {
        let (_dir, layout) = setup();
        let client = FixedBody { body: b"corrupted!!", hits: AtomicUsize::new(0) };
        let fetcher = fetcher(client, &layout, 0);
        let job = job(&layout, 11, Some(Checksum::md5("5eb63bbbe01eeed093cb22bb8f5acdc3").unwrap()));

        let outcome = fetcher.download(&job).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Mismatch { .. }));
        assert!(job.destination.exists());
        assert_eq!(fetcher.fetcher.client().hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mismatch_retries_when_configured() {
        let (_dir, layout) = setup();
        let client = FixedBody { body: b"corrupted!!", hits: AtomicUsize::new(0) };
        let fetcher = fetcher(client, &layout, 2);
        let job = job(&layout, 11, Some(Checksum::md5("5eb63bbbe01eeed093cb22bb8f5acdc3").unwrap()));

        let outcome = fetcher.download(&job).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Mismatch { .. }));
        assert_eq!(fetcher.fetcher.client().hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_upstream_error_carries_url() {
        let (_dir, layout) = setup();
        let fetcher = fetcher(Failing, &layout, 0);
        let job = job(&layout, 11, None);

        let err = fetcher.download(&job).await.unwrap_err();
        assert!(err.to_string().contains("https://files.example/foo-1.0.tar.gz"));
        assert!(!job.destination.exists());
    }
}
