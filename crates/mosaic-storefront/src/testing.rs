//! Test doubles for the upstream owner.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mosaic_fetch::{FetchError, FetchRequest, FetchResponse, HttpClient};
use tokio::sync::Barrier;

type Hook = Box<dyn Fn(&FetchRequest) + Send + Sync>;

/// Answers requests from canned routes and records what it was sent.
///
/// Routes match on the URL without its query string; the first match wins.
#[derive(Default)]
pub struct FakeClient {
    routes: Vec<(String, Result<FetchResponse, FetchError>)>,
    sent: Mutex<Vec<FetchRequest>>,
    gate: Option<(Vec<String>, Arc<Barrier>)>,
    hook: Option<Hook>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .push((url.to_string(), Ok(FetchResponse::new(status, Vec::new(), body))));
        self
    }

    pub fn fail(mut self, url: &str, error: FetchError) -> Self {
        self.routes.push((url.to_string(), Err(error)));
        self
    }

    /// Hold requests to `urls` until every one of them is in flight.
    pub fn gate(mut self, urls: &[&str]) -> Self {
        let barrier = Arc::new(Barrier::new(urls.len()));
        self.gate = Some((urls.iter().map(|u| u.to_string()).collect(), barrier));
        self
    }

    /// Run `hook` on every request before answering it.
    pub fn on_send(mut self, hook: impl Fn(&FetchRequest) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn sent(&self) -> Vec<FetchRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, url: &str) -> Vec<FetchRequest> {
        self.sent()
            .into_iter()
            .filter(|r| r.url.split('?').next() == Some(url))
            .collect()
    }
}

#[async_trait(?Send)]
impl HttpClient for FakeClient {
    async fn send(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        self.sent.lock().unwrap().push(request.clone());
        let path = request.url.split('?').next().unwrap_or_default();

        if let Some((urls, barrier)) = &self.gate {
            if urls.iter().any(|u| u == path) {
                barrier.wait().await;
            }
        }
        if let Some(hook) = &self.hook {
            hook(&request);
        }

        self.routes
            .iter()
            .find(|(url, _)| url == path)
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| Ok(FetchResponse::new(404, Vec::new(), "Not Found")))
    }
}
