use crate::{Error, Result};
use std::path::Path;

/// What [`ensure_alias`] did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasOutcome {
    /// Alias and canonical names are identical; nothing to link.
    Same,
    /// Something already occupies the alias path.
    Existing,
    Created,
}

/// Create `root/alias` as a relative symlink to `canonical` (a sibling entry).
///
/// Any existing entry at the alias path is left untouched, dangling links included.
pub fn ensure_alias(root: impl AsRef<Path>, canonical: &str, alias: &str) -> Result<AliasOutcome> {
    if canonical == alias {
        return Ok(AliasOutcome::Same);
    }

    let link = root.as_ref().join(alias);
    if link.symlink_metadata().is_ok() {
        return Ok(AliasOutcome::Existing);
    }

    let target = Path::new(canonical);
    let map_err = |source| Error::Symlink {
        link: link.clone(),
        target: target.to_path_buf(),
        source,
    };

    #[cfg(unix)]
    std::os::unix::fs::symlink(target, &link).map_err(map_err)?;

    #[cfg(windows)]
    std::os::windows::fs::symlink_dir(target, &link).map_err(map_err)?;

    Ok(AliasOutcome::Created)
}
