use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::Result;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// Both operations issue a GET and fail with [`FetchError::Status`] on any
/// non-success status, so callers never inspect responses themselves. The
/// `timeout` bounds the entire request, body included.
///
/// [`FetchError::Status`]: crate::FetchError::Status
pub trait HttpClient: Send + Sync {
    /// Fetch the whole response body into memory.
    fn get(&self, url: &str, timeout: Duration) -> impl Future<Output = Result<Bytes>> + Send;

    /// Open the response body as a stream of chunks.
    fn stream(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<BoxStream<'static, Result<Bytes>>>> + Send;
}

impl<C: HttpClient> HttpClient for std::sync::Arc<C> {
    fn get(&self, url: &str, timeout: Duration) -> impl Future<Output = Result<Bytes>> + Send {
        (**self).get(url, timeout)
    }

    fn stream(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<BoxStream<'static, Result<Bytes>>>> + Send {
        (**self).stream(url, timeout)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use futures_util::StreamExt;

    use crate::core::retry_delay;
    use crate::data::ClientOptions;
    use crate::error::FetchError;

    /// Production client. Cloning is cheap and shares the connection pool.
    #[derive(Clone)]
    pub struct ReqwestClient {
        client:  reqwest::Client,
        options: ClientOptions,
    }

    impl ReqwestClient {
        pub fn new(options: ClientOptions) -> Result<Self> {
            let client = reqwest::Client::builder()
                .user_agent(options.user_agent.clone())
                .build()
                .map_err(|e| FetchError::Client(e.to_string()))?;
            Ok(Self { client, options })
        }

        async fn send(&self, url: &str, timeout: Duration) -> Result<reqwest::Response> {
            let parsed = reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

            let mut attempt = 0;
            loop {
                match self.client.get(parsed.clone()).timeout(timeout).send().await {
                    Ok(response) => return check_status(url, response),
                    Err(e) if e.is_connect() && attempt < self.options.connect_retries => {
                        let delay = retry_delay(attempt, self.options.retry_backoff);
                        tracing::debug!(url, attempt, ?delay, "connection failed, retrying");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    Err(e) => return Err(map_reqwest(url, e)),
                }
            }
        }
    }

    fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(FetchError::Status {
                url:    url.to_string(),
                status: status.as_u16(),
            })
        }
    }

    fn map_reqwest(url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = e.status() {
            FetchError::Status {
                url:    url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Network {
                url:     url.to_string(),
                message: e.to_string(),
            }
        }
    }

    impl HttpClient for ReqwestClient {
        async fn get(&self, url: &str, timeout: Duration) -> Result<Bytes> {
            let response = self.send(url, timeout).await?;
            response.bytes().await.map_err(|e| map_reqwest(url, e))
        }

        async fn stream(
            &self,
            url: &str,
            timeout: Duration,
        ) -> Result<BoxStream<'static, Result<Bytes>>> {
            let response = self.send(url, timeout).await?;
            let owned_url = url.to_string();
            let stream = response
                .bytes_stream()
                .map(move |chunk| chunk.map_err(|e| map_reqwest(&owned_url, e)));
            Ok(Box::pin(stream))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
