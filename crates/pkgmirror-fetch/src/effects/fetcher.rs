use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use pkgmirror_verify::{Checksum, Hasher, VerificationError};
use tokio::io::AsyncWriteExt;

use crate::data::{Download, Verification};
use crate::effects::http::HttpClient;
use crate::error::{FetchError, Result};

/// Downloads single artifacts into place while hashing them.
///
/// Bodies stream into a temp file under `staging_dir` and are renamed onto the
/// destination once complete, so an interrupted download never leaves a
/// truncated artifact behind. `staging_dir` must share a filesystem with the
/// destinations.
pub struct Fetcher<C: HttpClient> {
    client:      C,
    staging_dir: PathBuf,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            staging_dir: staging_dir.into(),
        }
    }

    pub fn client(&self) -> &C { &self.client }

    /// Download `url` to `destination`, overwriting whatever is there.
    ///
    /// A checksum mismatch is not an error: the file is still placed and the
    /// outcome is reported through [`Download::verification`].
    pub async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        checksum: Option<&Checksum>,
        timeout: Duration,
    ) -> Result<Download> {
        pkgmirror_fs::ensure_dir(&self.staging_dir)?;

        let staged = tempfile::Builder::new()
            .prefix(".download.")
            .suffix(".part")
            .tempfile_in(&self.staging_dir)
            .map_err(|e| FetchError::io(&self.staging_dir, e))?;
        let (file, staged_path) = staged.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut stream = self.client.stream(url, timeout).await?;
        let mut hasher = checksum.map(Checksum::hasher);
        let mut bytes = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Some(h) = hasher.as_mut() {
                h.update(&chunk);
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::io(&*staged_path, e))?;
            bytes += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| FetchError::io(&*staged_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| FetchError::io(&*staged_path, e))?;
        drop(file);

        let verification = match (checksum, hasher) {
            (Some(expected), Some(h)) => match expected.verify(h.finalize()) {
                Err(VerificationError::Mismatch { expected, actual }) => {
                    Verification::Mismatch { expected, actual }
                }
                _ => Verification::Verified,
            },
            _ => Verification::Unchecked,
        };

        staged_path
            .persist(destination)
            .map_err(|e| FetchError::io(destination, e.error))?;

        Ok(Download {
            path: destination.to_path_buf(),
            bytes,
            verification,
        })
    }
}
