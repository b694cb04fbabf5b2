use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use pkgmirror_fetch::{BoxStream, FetchError, HttpClient, Result};

pub const METADATA_URL: &str = "https://index.test/pypi/{name}/json";
pub const CATALOG_URL: &str = "https://index.test/simple/";

enum Response {
    Body(Bytes),
    Status(u16),
}

/// In-memory upstream keyed by URL; unknown URLs answer 404.
#[derive(Default)]
pub struct MockClient {
    routes: Mutex<HashMap<String, Response>>,
    hits:   Mutex<HashMap<String, usize>>,
}

#[allow(dead_code)]
impl MockClient {
    pub fn new() -> Self { Self::default() }

    pub fn body(&self, url: impl Into<String>, body: impl Into<Bytes>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), Response::Body(body.into()));
    }

    pub fn status(&self, url: impl Into<String>, status: u16) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), Response::Status(status));
    }

    pub fn metadata(&self, name: &str, document: serde_json::Value) {
        self.body(
            METADATA_URL.replace("{name}", name),
            serde_json::to_vec(&document).unwrap(),
        );
    }

    pub fn hits(&self, url: &str) -> usize { self.hits.lock().unwrap().get(url).copied().unwrap_or(0) }

    pub fn total_hits(&self) -> usize { self.hits.lock().unwrap().values().sum() }

    fn respond(&self, url: &str) -> Result<Bytes> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
        match self.routes.lock().unwrap().get(url) {
            Some(Response::Body(body)) => Ok(body.clone()),
            Some(Response::Status(status)) => Err(FetchError::Status {
                url:    url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url:    url.to_string(),
                status: 404,
            }),
        }
    }
}

impl HttpClient for MockClient {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<Bytes> { self.respond(url) }

    async fn stream(&self, url: &str, _timeout: Duration) -> Result<BoxStream<'static, Result<Bytes>>> {
        let body = self.respond(url)?;
        let chunks: Vec<Result<Bytes>> = vec![Ok(body)];
        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}

#[allow(dead_code)]
pub fn md5_hex(data: &[u8]) -> String {
    use pkgmirror_verify::{Hasher, Md5Hasher};

    let mut hasher = Md5Hasher::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[allow(dead_code)]
pub fn file_entry(filename: &str, body: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "filename": filename,
        "url": format!("https://files.test/{filename}"),
        "size": body.len(),
        "md5_digest": md5_hex(body),
    })
}
