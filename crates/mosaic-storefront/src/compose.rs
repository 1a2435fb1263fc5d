//! Page composition over remote fragments.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use mosaic_core::{
    AssetDescriptor, FragmentRequest, InjectType, Partials, RenderMode, MAIN_PARTIAL,
    RENDER_MODE_QUERY, VERSION_QUERY,
};
use mosaic_html::{collect_assets, AssetTags, PageDocument};
use serde::Serialize;

use crate::error::StorefrontError;
use crate::proxy::{active_version, FragmentStorefront, Snapshot};

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";

/// A page made of remote fragments, in placement order.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page name, used in the document title.
    pub name: String,
    /// Route the page is served on.
    pub url: String,
    /// Fragments in placement order.
    pub fragments: Vec<Arc<FragmentStorefront>>,
}

/// A composed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPage {
    /// HTTP status.
    pub status: u16,
    /// Content type of `body`.
    pub content_type: &'static str,
    /// Response body.
    pub body: String,
}

/// One fragment after content or fallback resolution.
#[derive(Debug, Clone, Default)]
struct Resolved {
    partials: Partials,
    tags: AssetTags,
    fell_back: bool,
}

/// STREAM output of a page; placement is left to the receiver.
#[derive(Debug, Serialize)]
struct StreamPage<'a> {
    page: &'a str,
    fragments: BTreeMap<&'a str, &'a Partials>,
    assets: BTreeMap<&'a str, &'a AssetTags>,
}

impl Page {
    /// Create a page.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            fragments: Vec::new(),
        }
    }

    /// Append a fragment.
    pub fn with_fragment(mut self, fragment: Arc<FragmentStorefront>) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Compose the page for a request.
    ///
    /// Fragments are fetched concurrently; output is emitted once every
    /// fragment has content or a fallback. Only an unknown render mode
    /// fails.
    #[tracing::instrument(skip_all, fields(page = %self.name, request_id = %req.request_id))]
    pub async fn compose(&self, req: &FragmentRequest) -> Result<ComposedPage, StorefrontError> {
        let mode = RenderMode::from_query(req.query_param(RENDER_MODE_QUERY))?;

        // Versions are chosen per fragment by cookie, never for the whole page.
        let mut fragment_req = req.clone();
        fragment_req.query.remove(VERSION_QUERY);
        let attributes = forwarded_attributes(&fragment_req);

        let resolved = join_all(
            self.fragments
                .iter()
                .map(|fragment| resolve_fragment(fragment, &fragment_req, &attributes)),
        )
        .await;

        let fallbacks = resolved.iter().filter(|r| r.fell_back).count();
        tracing::info!(mode = %mode, fragments = resolved.len(), fallbacks, "page composed");

        match mode {
            RenderMode::Preview => Ok(ComposedPage {
                status: 200,
                content_type: HTML,
                body: self.render_preview(&resolved),
            }),
            RenderMode::Stream => Ok(ComposedPage {
                status: 200,
                content_type: JSON,
                body: self.render_stream(&resolved)?,
            }),
        }
    }

    fn render_preview(&self, resolved: &[Resolved]) -> String {
        let mut document = PageDocument::browsing(&self.name);
        for fragment in resolved {
            let main = fragment
                .partials
                .get(MAIN_PARTIAL)
                .map(String::as_str)
                .unwrap_or("");
            document.push_fragment(main, &fragment.tags);
        }
        document.render()
    }

    fn render_stream(&self, resolved: &[Resolved]) -> Result<String, StorefrontError> {
        let names = self.fragments.iter().map(|f| f.name());
        let stream = StreamPage {
            page: &self.name,
            fragments: names.clone().zip(resolved.iter().map(|r| &r.partials)).collect(),
            assets: names.zip(resolved.iter().map(|r| &r.tags)).collect(),
        };
        Ok(serde_json::to_string(&stream)?)
    }
}

/// Page query parameters forwarded to every fragment, minus the render mode.
fn forwarded_attributes(req: &FragmentRequest) -> BTreeMap<String, String> {
    req.query
        .iter()
        .filter(|(name, _)| name.as_str() != RENDER_MODE_QUERY)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Content, fallback and tags of one fragment.
///
/// Everything is read from one snapshot, so an `update` landing mid-request
/// never mixes two configurations.
async fn resolve_fragment(
    fragment: &FragmentStorefront,
    req: &FragmentRequest,
    attributes: &BTreeMap<String, String>,
) -> Resolved {
    let Some(snapshot) = fragment.snapshot() else {
        tracing::warn!(fragment = fragment.name(), "fragment not configured, falling back");
        return Resolved {
            partials: Partials::from([(MAIN_PARTIAL.to_string(), String::new())]),
            tags: AssetTags::default(),
            fell_back: true,
        };
    };

    let content = fragment.content_from(&snapshot, req, attributes).await;

    if content.failed {
        return Resolved {
            partials: Partials::from([(MAIN_PARTIAL.to_string(), fallback(fragment, &snapshot, req).await)]),
            tags: AssetTags::default(),
            fell_back: true,
        };
    }

    Resolved {
        partials: content.html,
        tags: fragment_tags(fragment, &snapshot, req).await,
        fell_back: false,
    }
}

async fn fallback(fragment: &FragmentStorefront, snapshot: &Snapshot, req: &FragmentRequest) -> String {
    let placeholder_enabled = snapshot.config.render.placeholder;

    tracing::warn!(fragment = fragment.name(), placeholder_enabled, "falling back");

    if placeholder_enabled {
        fragment.placeholder_from(snapshot, req).await
    } else {
        String::new()
    }
}

/// Asset tags of the active version, with inline bodies fetched from the owner.
async fn fragment_tags(fragment: &FragmentStorefront, snapshot: &Snapshot, req: &FragmentRequest) -> AssetTags {
    let version = active_version(&snapshot.config, req);
    let assets = snapshot.config.version_assets(version);

    let inline_assets: Vec<&AssetDescriptor> = assets
        .iter()
        .filter(|asset| asset.inject_type == InjectType::Inline)
        .collect();

    let bodies = join_all(
        inline_assets
            .iter()
            .map(|asset| fragment.asset_from(snapshot, version, asset)),
    )
    .await;

    let mut inline = BTreeMap::new();
    for (asset, body) in inline_assets.into_iter().zip(bodies) {
        match body {
            Ok(body) => {
                inline.insert(asset.name.clone(), body);
            }
            Err(err) => tracing::warn!(
                fragment = fragment.name(),
                asset = %asset.name,
                error = %err,
                "inline asset unavailable"
            ),
        }
    }

    collect_assets(fragment.name(), version, assets, &inline)
}
