//! Content verification primitives for mirrored artifacts.
//!
//! Hashes are computed incrementally so a download can be verified while it
//! streams to disk, touching each chunk once.
//!
//! # Example
//!
//! ```
//! use pkgmirror_verify::{Checksum, Hasher};
//!
//! let checksum = Checksum::md5("5eb63bbbe01eeed093cb22bb8f5acdc3").unwrap();
//! let mut hasher = checksum.hasher();
//! hasher.update(b"hello ");
//! hasher.update(b"world");
//!
//! assert!(checksum.verify(hasher.finalize()).is_ok());
//! ```

pub use self::checksum::{Algorithm, AnyHasher, Checksum};
pub use self::error::{Result, VerificationError};
pub use self::hasher::{DigestHasher, Hasher, Md5Hasher, Sha256Hasher};

mod checksum;
mod error;
mod hasher;
