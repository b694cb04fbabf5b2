use std::fmt;

use crate::error::{MirrorError, Result};

/// A package name as listed by the catalog plus its lowercase alias.
///
/// The canonical form names the mirror directory, so it is rejected when it
/// could escape the packages directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName {
    canonical:  String,
    normalized: String,
}

impl PackageName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let canonical = name.into();
        let trimmed = canonical.trim();
        if trimmed.is_empty()
            || trimmed != canonical
            || canonical == "."
            || canonical == ".."
            || canonical.contains(['/', '\\', '\0'])
        {
            return Err(MirrorError::InvalidName(canonical));
        }

        let normalized = canonical.to_lowercase();
        Ok(Self {
            canonical,
            normalized,
        })
    }

    pub fn canonical(&self) -> &str { &self.canonical }

    pub fn normalized(&self) -> &str { &self.normalized }

    /// Whether the lowercase alias differs from the directory name.
    pub fn needs_alias(&self) -> bool { self.canonical != self.normalized }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.canonical) }
}
