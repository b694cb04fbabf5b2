//! Which release files belong in the mirror.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_EXTENSIONS: [&str; 6] = ["bz2", "egg", "gz", "tgz", "whl", "zip"];

const WINDOWS_TAGS: [&str; 3] = ["win32", "-win_amd64", "-win-amd64"];

static MACOS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-_.]macosx[-_][0-9]+[-_.][0-9]+.*\.(?:egg|whl)$").expect("valid macOS tag regex")
});

/// Why a file was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The filename could name something outside the package directory.
    UnsafeName,
    WindowsBuild,
    MacosBuild,
    Extension(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    extensions:        BTreeSet<String>,
    exclude_platforms: bool,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            extensions:        DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude_platforms: true,
        }
    }
}

impl FileFilter {
    pub fn new<I, S>(extensions: I, exclude_platforms: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            exclude_platforms,
        }
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> { self.extensions.iter().map(String::as_str) }

    pub fn check(&self, filename: &str) -> Result<(), Rejection> {
        if filename.is_empty()
            || filename.starts_with('.')
            || filename.contains(['/', '\\', '\0'])
        {
            return Err(Rejection::UnsafeName);
        }

        if self.exclude_platforms {
            if WINDOWS_TAGS.iter().any(|tag| filename.contains(tag)) {
                return Err(Rejection::WindowsBuild);
            }
            if MACOS_REGEX.is_match(filename) {
                return Err(Rejection::MacosBuild);
            }
        }

        let extension = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        if !self.extensions.contains(extension) {
            return Err(Rejection::Extension(extension.to_string()));
        }

        Ok(())
    }

    pub fn accepts(&self, filename: &str) -> bool { self.check(filename).is_ok() }
}
