use std::path::{Path, PathBuf};

use crate::error::Result;

pub const SNAPSHOT_FILE: &str = "desc.json";
pub const FLOOR_FILE: &str = "version";

/// On-disk layout of a mirror root.
///
/// ```text
/// <root>/index
/// <root>/packages/<Name>/desc.json
/// <root>/packages/<Name>/version        (optional)
/// <root>/packages/<Name>/<artifacts>
/// <root>/packages/<name> -> <Name>
/// <root>/.staging/                      (in-flight downloads)
/// ```
#[derive(Debug, Clone)]
pub struct MirrorLayout {
    root: PathBuf,
}

impl MirrorLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    /// Create the packages and staging directories.
    pub fn bootstrap(&self) -> Result<()> {
        pkgmirror_fs::ensure_dir(self.packages_dir())?;
        pkgmirror_fs::ensure_dir(self.staging_dir())?;
        Ok(())
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn packages_dir(&self) -> PathBuf { self.root.join("packages") }

    pub fn staging_dir(&self) -> PathBuf { self.root.join(".staging") }

    pub fn index_path(&self) -> PathBuf { self.root.join("index") }

    pub fn package_dir(&self, canonical: &str) -> PathBuf { self.packages_dir().join(canonical) }

    pub fn snapshot_path(&self, canonical: &str) -> PathBuf {
        self.package_dir(canonical).join(SNAPSHOT_FILE)
    }

    pub fn floor_path(&self, canonical: &str) -> PathBuf {
        self.package_dir(canonical).join(FLOOR_FILE)
    }

    pub fn artifact_path(&self, canonical: &str, filename: &str) -> PathBuf {
        self.package_dir(canonical).join(filename)
    }
}
