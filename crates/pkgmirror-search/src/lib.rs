//! Answer XML-RPC `search` calls from a mirror's flat index file.
//!
//! The index is re-read on every request, so lines appended by a running
//! mirror become visible without a restart.

mod codec;
mod error;
mod lookup;
mod server;

pub use codec::{escape, parse_search_term, render_response};
pub use error::{Result, SearchError};
pub use lookup::SearchIndex;
pub use server::{router, serve};
