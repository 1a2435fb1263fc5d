//! Native outbound HTTP through `reqwest`.

use async_trait::async_trait;

use crate::client::HttpClient;
use crate::error::FetchError;
use crate::request::FetchRequest;
use crate::response::FetchResponse;
use crate::timeout::TimeoutConfig;

/// `HttpClient` backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client applying the given timeouts to every request.
    pub fn new(timeout: TimeoutConfig) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .connect_timeout(timeout.connect)
            .timeout(timeout.total)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[async_trait(?Send)]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = self.inner.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| map_error(&request.url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_error(&request.url, e))?;

        tracing::debug!(url = %request.url, status, bytes = body.len(), "upstream response");
        Ok(FetchResponse::new(status, headers, body.to_vec()))
    }
}

fn map_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Request(format!("{}: {}", url, error))
    }
}
