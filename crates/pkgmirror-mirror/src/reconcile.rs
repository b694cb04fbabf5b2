//! Per-package reconciliation: metadata in, wanted files out, orphans purged.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use pkgmirror_fetch::HttpClient;
use pkgmirror_fs::{AliasOutcome, AtomicWriteOptions};
use pkgmirror_version::VersionFloor;
use serde::Deserialize;

use crate::error::{MirrorError, Result};
use crate::fetch::FileJob;
use crate::filter::{FileFilter, Rejection};
use crate::index::IndexRecord;
use crate::layout::{FLOOR_FILE, MirrorLayout, SNAPSHOT_FILE};
use crate::metadata::{PackageMetadata, ReleaseFile, render_snapshot};
use crate::name::PackageName;
use crate::options::MirrorOptions;

/// Release files selected for one package.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub files:       Vec<ReleaseFile>,
    pub below_floor: usize,
    pub rejected:    usize,
}

impl ReleasePlan {
    /// Names that may stay in the package directory after the purge.
    pub fn keep_set(&self) -> HashSet<String> {
        self.files
            .iter()
            .map(|f| f.filename.clone())
            .chain([SNAPSHOT_FILE.to_string(), FLOOR_FILE.to_string()])
            .collect()
    }
}

/// Decide which release files belong on disk.
///
/// A version below `floor` is dropped whole; each remaining file must pass
/// `filter`. A filename listed under two versions is kept once.
pub fn plan_releases(
    name: &PackageName,
    metadata: &PackageMetadata,
    floor: Option<VersionFloor>,
    filter: &FileFilter,
) -> ReleasePlan {
    let mut plan = ReleasePlan::default();
    let mut seen = HashSet::new();

    for (version, descriptor) in metadata.releases() {
        if floor.is_some_and(|f| !f.admits(version)) {
            plan.below_floor += 1;
            continue;
        }

        match filter.check(&descriptor.filename) {
            Ok(()) => {}
            Err(Rejection::Extension(ext)) => {
                tracing::debug!(package = %name, filename = %descriptor.filename, ext, "skipping extension");
                plan.rejected += 1;
                continue;
            }
            Err(reason) => {
                tracing::debug!(package = %name, filename = %descriptor.filename, ?reason, "skipping file");
                plan.rejected += 1;
                continue;
            }
        }

        if seen.insert(descriptor.filename.clone()) {
            tracing::debug!(package = %name, filename = %descriptor.filename, "found");
            plan.files.push(ReleaseFile::new(name, version, descriptor));
        }
    }

    plan
}

/// One reconciler worker.
pub struct Reconciler<C> {
    client:  Arc<C>,
    layout:  MirrorLayout,
    options: Arc<MirrorOptions>,
    files:   Sender<FileJob>,
    results: Sender<IndexRecord>,
}

impl<C: HttpClient> Reconciler<C> {
    pub fn new(
        client: Arc<C>,
        layout: MirrorLayout,
        options: Arc<MirrorOptions>,
        files: Sender<FileJob>,
        results: Sender<IndexRecord>,
    ) -> Self {
        Self {
            client,
            layout,
            options,
            files,
            results,
        }
    }

    /// Drain the package queue until it is closed.
    pub async fn run(self, queue: Receiver<PackageName>) {
        while let Ok(name) = queue.recv().await {
            match self.reconcile(&name).await {
                Ok(Some(record)) => {
                    if self.results.send(record).await.is_err() {
                        tracing::error!(package = %name, "results queue closed, reconciler stopping");
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::error!(package = %name, error = %e, "reconciliation failed"),
            }
        }
    }

    /// Bring one package directory in line with upstream metadata.
    ///
    /// Returns `None` when the package no longer exists upstream.
    pub async fn reconcile(&self, name: &PackageName) -> Result<Option<IndexRecord>> {
        tracing::info!(package = %name, "working on package");

        let dir = self.layout.package_dir(name.canonical());
        if dir.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) {
            return Err(MirrorError::AliasedDirectory {
                package: name.canonical().to_string(),
                path:    dir,
            });
        }
        pkgmirror_fs::ensure_dir(&dir)?;
        self.ensure_alias(name);

        let url = self.options.metadata_url_for(name.canonical());
        let body = match self.client.get(&url, self.options.timeouts.metadata).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                tracing::debug!(package = %name, url, "package no longer exists upstream");
                return Ok(None);
            }
            Err(source) => return Err(MirrorError::Metadata { url, source }),
        };

        let document: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|source| MirrorError::InvalidMetadata { url: url.clone(), source })?;
        let metadata = PackageMetadata::deserialize(&document)
            .map_err(|source| MirrorError::InvalidMetadata { url: url.clone(), source })?;

        let snapshot = render_snapshot(&document)
            .map_err(|source| MirrorError::InvalidMetadata { url: url.clone(), source })?;
        let snapshot_path = self.layout.snapshot_path(name.canonical());
        blocking(move || {
            pkgmirror_fs::atomic_write(&snapshot_path, &snapshot, AtomicWriteOptions::new())?;
            Ok(())
        })
        .await?;

        let record = metadata.index_record(name);
        let floor = self.load_floor(name);
        let plan = plan_releases(name, &metadata, floor, &self.options.filter);
        let keep = plan.keep_set();

        for file in plan.files {
            let destination = dir.join(&file.filename);
            self.files
                .send(FileJob { file, destination })
                .await
                .map_err(|_| MirrorError::QueueClosed("file"))?;
        }

        let purge_dir = dir.clone();
        let removed = blocking(move || Ok(pkgmirror_fs::retain_only(&purge_dir, &keep)?)).await?;
        for path in &removed {
            tracing::info!(package = %name, path = %path.display(), "purged");
        }

        tracing::debug!(
            package = %name,
            below_floor = plan.below_floor,
            rejected = plan.rejected,
            purged = removed.len(),
            "reconciled"
        );
        Ok(Some(record))
    }

    fn ensure_alias(&self, name: &PackageName) {
        if !name.needs_alias() {
            return;
        }

        match pkgmirror_fs::ensure_alias(self.layout.packages_dir(), name.canonical(), name.normalized()) {
            Ok(AliasOutcome::Created) => {
                tracing::debug!(package = %name, alias = name.normalized(), "alias created")
            }
            Ok(_) => {}
            Err(source) => {
                let e = MirrorError::AliasCreationFailed {
                    package: name.canonical().to_string(),
                    alias: name.normalized().to_string(),
                    source,
                };
                tracing::warn!(package = %name, error = %e, "continuing without alias");
            }
        }
    }

    fn load_floor(&self, name: &PackageName) -> Option<VersionFloor> {
        let path: PathBuf = self.layout.floor_path(name.canonical());
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(package = %name, path = %path.display(), error = %e, "unreadable version floor ignored");
                return None;
            }
        };

        match VersionFloor::parse(&contents) {
            Ok(floor) => Some(floor),
            Err(e) => {
                tracing::debug!(package = %name, error = %e, "version floor disabled");
                None
            }
        }
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(doc: serde_json::Value) -> PackageMetadata { serde_json::from_value(doc).unwrap() }

    fn file(name: &str) -> serde_json::Value {
        json!({"filename": name, "url": format!("https://files.example/{name}"), "size": 1})
    }

    fn filenames(plan: &ReleasePlan) -> Vec<&str> { plan.files.iter().map(|f| f.filename.as_str()).collect() }

    #[test]
    fn test_plan_applies_filters() {
        let name = PackageName::new("Foo").unwrap();
        let meta = metadata(json!({"releases": {"1.0": [
            file("foo-1.0.tar.gz"),
            file("foo-1.0.exe"),
            file("foo-1.0-cp39-cp39-win_amd64.whl"),
            file("foo-1.0-py3-none-any.whl"),
        ]}}));

        let plan = plan_releases(&name, &meta, None, &FileFilter::default());

        assert_eq!(filenames(&plan), vec!["foo-1.0.tar.gz", "foo-1.0-py3-none-any.whl"]);
        assert_eq!(plan.rejected, 2);
        assert_eq!(plan.files[0].version, "1.0");
    }

    #[test]
    fn test_plan_applies_floor() {
        let name = PackageName::new("Foo").unwrap();
        let meta = metadata(json!({"releases": {
            "1.5": [file("foo-1.5.tar.gz"), file("foo-1.5.zip")],
            "2.0": [file("foo-2.0.tar.gz")],
        }}));

        let plan = plan_releases(&name, &meta, Some(VersionFloor::new(2)), &FileFilter::default());

        assert_eq!(filenames(&plan), vec!["foo-2.0.tar.gz"]);
        assert_eq!(plan.below_floor, 2);
    }

    #[test]
    fn test_plan_deduplicates_filenames() {
        let name = PackageName::new("Foo").unwrap();
        let meta = metadata(json!({"releases": {
            "1.0": [file("foo-1.0.tar.gz")],
            "1.0.0": [file("foo-1.0.tar.gz")],
        }}));

        let plan = plan_releases(&name, &meta, None, &FileFilter::default());
        assert_eq!(filenames(&plan), vec!["foo-1.0.tar.gz"]);
    }

    #[test]
    fn test_keep_set_protects_metadata_files() {
        let plan = ReleasePlan::default();
        let keep = plan.keep_set();
        assert!(keep.contains("desc.json"));
        assert!(keep.contains("version"));
        assert_eq!(keep.len(), 2);
    }
}
