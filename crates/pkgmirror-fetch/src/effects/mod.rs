//! I/O layer: HTTP access and artifact placement.

mod fetcher;
mod http;

pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
