//! Polling a fragment owner's export.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use mosaic_core::GatewayExport;
use mosaic_fetch::{fetch_ok, FetchRequest, HttpClient};

use crate::error::StorefrontError;
use crate::proxy::FragmentStorefront;

/// Keeps the proxies of one owner in sync with its export.
pub struct GatewayClient {
    name: String,
    url: String,
    client: Arc<dyn HttpClient>,
    fragments: ArcSwap<BTreeMap<String, Arc<FragmentStorefront>>>,
    hash: ArcSwapOption<String>,
}

impl GatewayClient {
    /// Create a client for an owner.
    pub fn new(name: impl Into<String>, url: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
            fragments: ArcSwap::from_pointee(BTreeMap::new()),
            hash: ArcSwapOption::empty(),
        }
    }

    /// Gateway name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owner base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether an export has been applied.
    pub fn is_ready(&self) -> bool {
        self.hash.load().is_some()
    }

    /// Hash of the last applied export.
    pub fn hash(&self) -> Option<String> {
        self.hash.load_full().map(|h| h.as_ref().clone())
    }

    /// The proxy for a fragment, created unconfigured on first use.
    ///
    /// The same proxy is returned for every call with the same name, so
    /// pages built before the first refresh see later updates.
    pub fn fragment(&self, name: &str) -> Arc<FragmentStorefront> {
        if let Some(existing) = self.fragments.load().get(name) {
            return existing.clone();
        }

        let created = Arc::new(FragmentStorefront::new(name, self.client.clone()));
        self.fragments.rcu(|current| {
            let mut next = BTreeMap::clone(current);
            next.entry(name.to_string()).or_insert_with(|| created.clone());
            next
        });

        self.fragments
            .load()
            .get(name)
            .cloned()
            .unwrap_or(created)
    }

    /// Names of the known fragments.
    pub fn fragment_names(&self) -> Vec<String> {
        self.fragments.load().keys().cloned().collect()
    }

    /// Fetch the export and push it to the proxies if it changed.
    ///
    /// Returns whether an update was applied.
    #[tracing::instrument(skip(self), fields(gateway = %self.name, url = %self.url))]
    pub async fn refresh(&self) -> Result<bool, StorefrontError> {
        let url = format!("{}/", self.url.trim_end_matches('/'));
        let response = match fetch_ok(self.client.as_ref(), FetchRequest::get(&url)).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "gateway export unavailable");
                return Err(err.into());
            }
        };
        let export: GatewayExport = response.json()?;

        if !export.verify() {
            tracing::warn!(hash = %export.hash, "export hash does not match its fragments");
        }

        if self.hash.load().as_deref() == Some(&export.hash) {
            tracing::debug!(hash = %export.hash, "gateway unchanged");
            return Ok(false);
        }

        for (name, config) in &export.fragments {
            self.fragment(name).update(config.clone(), &self.url);
        }
        for name in self.fragment_names() {
            if !export.fragments.contains_key(&name) {
                tracing::warn!(fragment = %name, "fragment no longer exported, keeping last configuration");
            }
        }

        tracing::info!(hash = %export.hash, fragments = export.fragments.len(), "gateway updated");
        self.hash.store(Some(Arc::new(export.hash)));
        Ok(true)
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("fragments", &self.fragment_names())
            .field("hash", &self.hash())
            .finish_non_exhaustive()
    }
}
