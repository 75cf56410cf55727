//! Timed fetch executor.
//!
//! One outbound GET with a hard timeout and outcome classification. No
//! retries here; the retry coordinator owns the budget.

use polylens_core::{FetchError, FetchResult};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Seam between the retrying API layer and the actual HTTP stack.
///
/// Tests substitute canned implementations; production uses
/// [`ReqwestTransport`].
pub trait HttpTransport: Send + Sync {
    /// Issue one GET and decode the body as JSON. Exactly one attempt.
    fn get_json<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FetchResult<Value>>;
}

/// Production transport over a pooled `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client with the configured hard per-request timeout.
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get_json<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FetchResult<Value>> {
        let request = self.client.get(url);
        let url = url.to_string();
        Box::pin(async move {
            debug!(url = %url, "GET");
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => return Err(FetchError::Timeout),
                Err(e) => return Err(FetchError::Network(e.to_string())),
            };

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound(url));
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(FetchError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            response.json::<Value>().await.map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::InvalidShape(format!("body is not JSON: {e}"))
                }
            })
        })
    }
}
