use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::post;

use crate::codec::{parse_search_term, render_response};
use crate::error::{Result, SearchError};
use crate::lookup::SearchIndex;

#[derive(Debug, Clone)]
struct AppState {
    index_path: Arc<PathBuf>,
}

/// Routes `POST /` and `POST /pypi` to the search handler.
pub fn router(index_path: impl Into<PathBuf>) -> Router {
    let state = AppState {
        index_path: Arc::new(index_path.into()),
    };
    Router::new()
        .route("/", post(search))
        .route("/pypi", post(search))
        .with_state(state)
}

async fn search(State(state): State<AppState>, body: String) -> Result<impl IntoResponse> {
    let term = parse_search_term(&body)?;

    let path = state.index_path.clone();
    let index = tokio::task::spawn_blocking(move || SearchIndex::load(&path))
        .await
        .map_err(|e| SearchError::Serve(std::io::Error::other(e)))??;

    let hits = index.search(&term);
    tracing::info!(term = %term, hits = hits.len(), "search");

    Ok(([(header::CONTENT_TYPE, "text/xml")], render_response(hits)))
}

/// Bind `addr` and answer searches until the process stops.
pub async fn serve(addr: SocketAddr, index_path: PathBuf) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| SearchError::Bind { addr, source })?;
    tracing::info!(%addr, index = %index_path.display(), "search responder listening");

    axum::serve(listener, router(index_path))
        .await
        .map_err(SearchError::Serve)
}
