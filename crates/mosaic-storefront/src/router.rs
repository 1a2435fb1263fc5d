//! The composer's HTTP surface.

use std::sync::Arc;

use futures::future::join_all;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use mosaic_core::{AssetType, FragmentRequest};
use mosaic_fetch::HttpClient;

use crate::compose::Page;
use crate::config::StorefrontConfig;
use crate::error::StorefrontError;
use crate::gateway::GatewayClient;
use crate::proxy::FragmentStorefront;

const TEXT: &str = "text/plain; charset=utf-8";

/// Gateways and pages served by one composer process.
#[derive(Debug)]
pub struct Storefront {
    gateways: Vec<GatewayClient>,
    pages: Vec<Page>,
}

impl Storefront {
    /// Create a storefront from its configuration.
    ///
    /// Pages are wired to proxies that stay unconfigured until the first
    /// `refresh`.
    pub fn from_config(config: &StorefrontConfig, client: Arc<dyn HttpClient>) -> Result<Self, StorefrontError> {
        let gateways: Vec<GatewayClient> = config
            .gateways
            .iter()
            .map(|g| GatewayClient::new(&g.name, &g.url, client.clone()))
            .collect();

        let mut pages = Vec::with_capacity(config.pages.len());
        for page_config in &config.pages {
            let mut page = Page::new(&page_config.name, &page_config.url);
            for fragment in &page_config.fragments {
                let gateway = gateways
                    .iter()
                    .find(|g| g.name() == fragment.gateway)
                    .ok_or_else(|| StorefrontError::UnknownGateway {
                        page: page_config.name.clone(),
                        gateway: fragment.gateway.clone(),
                    })?;
                page = page.with_fragment(gateway.fragment(&fragment.name));
            }
            pages.push(page);
        }

        Ok(Self { gateways, pages })
    }

    /// Gateways by configuration order.
    pub fn gateways(&self) -> &[GatewayClient] {
        &self.gateways
    }

    /// Find a page by name.
    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// Find a fragment proxy by name across all gateways.
    pub fn fragment(&self, name: &str) -> Option<Arc<FragmentStorefront>> {
        self.gateways
            .iter()
            .find(|g| g.fragment_names().iter().any(|n| n == name))
            .map(|g| g.fragment(name))
    }

    /// Refresh every gateway concurrently.
    ///
    /// Returns how many gateways applied an update, or the first failure.
    pub async fn refresh(&self) -> Result<usize, StorefrontError> {
        let results = join_all(self.gateways.iter().map(|g| g.refresh())).await;
        let mut updated = 0;
        for result in results {
            if result? {
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Whether every gateway has applied an export.
    pub fn is_ready(&self) -> bool {
        self.gateways.iter().all(GatewayClient::is_ready)
    }

    /// Handle an HTTP request.
    pub async fn handle<B>(&self, req: &http::Request<B>) -> Response<Vec<u8>> {
        self.handle_request(&FragmentRequest::from_http(req)).await
    }

    /// Handle a parsed request.
    #[tracing::instrument(skip_all, fields(path = %req.path, request_id = %req.request_id))]
    pub async fn handle_request(&self, req: &FragmentRequest) -> Response<Vec<u8>> {
        if req.path == "/healthcheck" {
            return if self.is_ready() {
                respond(StatusCode::OK, TEXT, "OK")
            } else {
                respond(StatusCode::SERVICE_UNAVAILABLE, TEXT, "Not Ready")
            };
        }

        if let Some(page) = self.pages.iter().find(|p| p.url == req.path) {
            return match page.compose(req).await {
                Ok(composed) => respond(
                    StatusCode::from_u16(composed.status).unwrap_or(StatusCode::OK),
                    composed.content_type,
                    composed.body,
                ),
                Err(err) => error_response(&err),
            };
        }

        let segments: Vec<&str> = req.path.trim_start_matches('/').splitn(3, '/').collect();
        if let [fragment, "static", file] = segments.as_slice() {
            if !file.is_empty() {
                return match self.proxy_static(req, fragment, file).await {
                    Ok((kind, body)) => respond(StatusCode::OK, kind.content_type(), body),
                    Err(err) => error_response(&err),
                };
            }
        }

        respond(StatusCode::NOT_FOUND, TEXT, "Not Found")
    }

    async fn proxy_static(
        &self,
        req: &FragmentRequest,
        fragment: &str,
        file: &str,
    ) -> Result<(AssetType, String), StorefrontError> {
        let proxy = self
            .fragment(fragment)
            .ok_or_else(|| StorefrontError::UnknownFragment(fragment.to_string()))?;
        if !proxy.is_configured() {
            return Err(StorefrontError::UnknownFragment(fragment.to_string()));
        }

        proxy.get_static(req, file).await
    }
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Vec<u8>>) -> Response<Vec<u8>> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn error_response(err: &StorefrontError) -> Response<Vec<u8>> {
    tracing::warn!(error = %err, "request failed");
    respond(err.status(), TEXT, err.to_string())
}
