//! HTTP fetching for the mirror pipeline.
//!
//! # Architecture
//!
//! - [`data`] - option and outcome types
//! - [`core`] - pure helpers (retry backoff)
//! - [`effects`] - the [`HttpClient`] seam, its reqwest implementation and the
//!   artifact [`Fetcher`]
//!
//! Policy stays with the caller: the fetcher reports a checksum mismatch as a
//! [`Verification`] outcome and leaves the decision to retry or keep the file
//! to the pipeline.

mod core;
mod data;
mod effects;
mod error;

pub use core::retry_delay;
pub use data::{ClientOptions, Download, Timeouts, Verification};
pub use effects::{BoxStream, Fetcher, HttpClient};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, Result};
