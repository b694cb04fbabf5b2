//! Filesystem primitives for a local package mirror tree.
//!
//! Every mutation a mirror run performs on disk goes through this crate:
//!
//! - [`atomic_write`] - replace a file through a sibling temp file and rename
//! - [`ensure_alias`] - relative directory symlink from an alias name to a canonical name
//! - [`retain_only`] - delete every regular file in a directory that is not in a keep set
//! - [`file_len`] - size probe used by the download short-circuit

mod error;
mod primitives;

pub use error::{Error, Result};
pub use primitives::{
    AliasOutcome, AtomicWriteOptions, atomic_write, ensure_alias, ensure_dir,
    file_len, retain_only,
};
