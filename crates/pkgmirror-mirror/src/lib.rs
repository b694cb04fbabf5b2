//! Mirror a package index to local disk.
//!
//! A run lists every package name from the catalog and pushes the names
//! through two worker pools connected by bounded queues:
//!
//! ```text
//! catalog -> [package queue] -> reconcilers -> [file queue] -> fetchers
//!                                    |
//!                                    +-> [results queue] -> index writer
//! ```
//!
//! Reconcilers fetch per-package metadata, decide which release files belong
//! on disk, enqueue them for download and purge everything else. Fetchers
//! download and verify single artifacts. The driver appends one index line per
//! reconciled package. Queue capacity is the only admission control; closing a
//! queue is the only stop signal.

mod catalog;
mod error;
mod fetch;
mod filter;
mod index;
mod layout;
mod metadata;
mod name;
mod options;
mod pipeline;
mod pool;
mod reconcile;

pub use catalog::{fetch_catalog, parse_catalog};
pub use error::{MirrorError, Result};
pub use fetch::{FetchOutcome, FileFetcher, FileJob};
pub use filter::{FileFilter, Rejection};
pub use index::{IndexRecord, IndexWriter};
pub use layout::MirrorLayout;
pub use metadata::{FileDescriptor, PackageMetadata, ReleaseFile, render_snapshot};
pub use name::PackageName;
pub use options::MirrorOptions;
pub use pipeline::{Mirror, MirrorReport};
pub use pool::WorkerPool;
pub use reconcile::{ReleasePlan, Reconciler, plan_releases};
