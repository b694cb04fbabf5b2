pub mod atomic_write;
pub mod purge;
pub mod symlink;

pub use atomic_write::{AtomicWriteOptions, atomic_write};
pub use purge::{ensure_dir, file_len, retain_only};
pub use symlink::{AliasOutcome, ensure_alias};
