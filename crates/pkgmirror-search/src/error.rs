use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] roxmltree::Error),

    #[error("request carries no search term")]
    MissingTerm,

    #[error("failed to read index {path}: {source}")]
    Index {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr:   SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

impl SearchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchError::MalformedRequest(_) | SearchError::MissingTerm => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "search failed");
        }
        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
