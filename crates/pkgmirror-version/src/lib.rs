//! Version floors: a per-package minimum below which releases are ignored.
//!
//! Release version strings on a package index are free-form, so comparison is
//! deliberately coarse: only the leading numeric component is considered.
//!
//! ```
//! use pkgmirror_version::VersionFloor;
//!
//! let floor: VersionFloor = "2".parse().unwrap();
//! assert!(!floor.admits("1.5"));
//! assert!(floor.admits("2.0"));
//! assert!(floor.admits("dev-snapshot"));
//! ```

pub use self::floor::{FloorError, VersionFloor, leading_component};

mod floor;
