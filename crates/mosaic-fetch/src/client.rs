//! The transport interface the composition engine depends on.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::request::FetchRequest;
use crate::response::FetchResponse;

/// Issues outbound HTTP requests.
///
/// Returned futures are not required to be `Send`: the engine runs on a
/// single-threaded event loop (Spin/WASI), where fetches suspend the current
/// request while others proceed. Non-2xx responses are returned as `Ok`;
/// callers decide what counts as a failure.
#[async_trait(?Send)]
pub trait HttpClient: Send + Sync {
    /// Send a request and buffer the whole response.
    async fn send(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

#[async_trait(?Send)]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn send(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        (**self).send(request).await
    }
}

/// Send a request and treat non-2xx statuses as errors.
pub async fn fetch_ok(
    client: &dyn HttpClient,
    request: FetchRequest,
) -> Result<FetchResponse, FetchError> {
    let url = request.url.clone();
    let response = client.send(request).await?;
    response.error_for_status(&url)
}
