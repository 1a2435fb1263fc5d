//! Spin outbound HTTP.

use async_trait::async_trait;
use spin_sdk::http::{Method, Request, Response};

use crate::client::HttpClient;
use crate::error::FetchError;
use crate::request::FetchRequest;
use crate::response::FetchResponse;

/// `HttpClient` using the Spin host's outbound HTTP.
///
/// Timeouts are enforced by the host's outbound configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinClient;

#[async_trait(?Send)]
impl HttpClient for SpinClient {
    async fn send(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = Request::builder();
        builder.method(Method::Get).uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder.header(name.as_str(), value.as_str());
        }

        let response: Response = spin_sdk::http::send(builder.build())
            .await
            .map_err(|e| FetchError::Request(format!("{}: {}", request.url, e)))?;

        let headers = response
            .headers()
            .filter_map(|(name, value)| Some((name.to_string(), value.as_str()?.to_string())))
            .collect();

        Ok(FetchResponse::new(
            *response.status(),
            headers,
            response.body().to_vec(),
        ))
    }
}
