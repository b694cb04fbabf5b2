use crate::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Length of the regular file at `path`, without following symlinks.
pub fn file_len(path: impl AsRef<Path>) -> Option<u64> {
    fs::symlink_metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

/// Remove every non-directory entry of `dir` whose name is not in `keep`.
///
/// Subdirectories are never touched. Returns the removed paths.
pub fn retain_only(dir: impl AsRef<Path>, keep: &HashSet<String>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let read_err = |source| Error::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut removed = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if entry.file_type().map_err(read_err)?.is_dir() {
            continue;
        }

        let name = entry.file_name();
        if name.to_str().is_some_and(|n| keep.contains(n)) {
            continue;
        }

        let path = entry.path();
        fs::remove_file(&path).map_err(|e| Error::Remove {
            path: path.clone(),
            source: e,
        })?;
        removed.push(path);
    }

    removed.sort();
    Ok(removed)
}
