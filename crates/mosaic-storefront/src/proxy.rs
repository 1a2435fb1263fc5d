//! Composer-side proxy to one remote fragment.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use mosaic_core::{
    AssetDescriptor, AssetType, ExposeFragment, FragmentError, FragmentRequest, Partials, RenderMode,
    RENDER_MODE_QUERY, VERSION_QUERY,
};
use mosaic_fetch::{fetch_ok, FetchError, FetchRequest, FetchResponse, HttpClient};

use crate::error::StorefrontError;

/// The owner-pushed configuration of a fragment, replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Exposed fragment configuration.
    pub config: ExposeFragment,
    /// Base URL of the owner.
    pub base_url: String,
}

impl Snapshot {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Result of a content fetch.
///
/// Failures never surface as errors: a failed result carries an empty body
/// and `failed = true`, and the caller substitutes a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentContent<T = Partials> {
    /// Upstream status, or 0 when no response arrived.
    pub status: u16,
    /// Upstream response headers.
    pub headers: Vec<(String, String)>,
    /// Partials in STREAM mode, a document in PREVIEW mode.
    pub html: T,
    /// Whether the fetch failed.
    pub failed: bool,
}

impl<T: Default> FragmentContent<T> {
    fn failed(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            html: T::default(),
            failed: true,
        }
    }
}

/// Proxy to one fragment served by a remote owner.
///
/// Created once per fragment name and reconfigured in place by `update`.
pub struct FragmentStorefront {
    name: String,
    client: Arc<dyn HttpClient>,
    snapshot: ArcSwapOption<Snapshot>,
}

impl FragmentStorefront {
    /// Create an unconfigured proxy.
    pub fn new(name: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            name: name.into(),
            client,
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// Fragment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the configuration and owner URL.
    ///
    /// Readers see either the previous or the new snapshot, never a mix.
    pub fn update(&self, config: ExposeFragment, base_url: impl Into<String>) {
        let snapshot = Snapshot {
            config,
            base_url: base_url.into(),
        };
        tracing::debug!(
            fragment = %self.name,
            version = %snapshot.config.version,
            url = %snapshot.base_url,
            "fragment configuration updated"
        );
        self.snapshot.store(Some(Arc::new(snapshot)));
    }

    /// The current configuration, if any has been pushed.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.load_full()
    }

    /// Whether a configuration has been pushed.
    pub fn is_configured(&self) -> bool {
        self.snapshot.load().is_some()
    }

    /// Default version on the owner.
    pub fn primary_version(&self) -> Option<String> {
        self.snapshot().map(|s| s.config.version.clone())
    }

    /// Version whose assets a request should see.
    ///
    /// An explicit `__version` query wins, then the version cookie, then
    /// the owner's default. Versions the owner does not deploy are skipped.
    pub fn active_version(&self, req: &FragmentRequest) -> Option<String> {
        let snapshot = self.snapshot()?;
        Some(active_version(&snapshot.config, req).to_string())
    }

    /// Fetch the fragment's partials (STREAM mode).
    pub async fn get_content(
        &self,
        req: &FragmentRequest,
        attributes: &BTreeMap<String, String>,
    ) -> FragmentContent<Partials> {
        match self.snapshot() {
            Some(snapshot) => self.content_from(&snapshot, req, attributes).await,
            None => self.content_failed(0, &FetchError::NotConfigured(self.name.clone())),
        }
    }

    /// STREAM content fetched against a snapshot the caller already holds.
    pub(crate) async fn content_from(
        &self,
        snapshot: &Snapshot,
        req: &FragmentRequest,
        attributes: &BTreeMap<String, String>,
    ) -> FragmentContent<Partials> {
        match self.fetch_content(snapshot, req, attributes, RenderMode::Stream).await {
            Ok(response) => match response.json::<Partials>() {
                Ok(partials) => FragmentContent {
                    status: response.status,
                    headers: response.headers,
                    html: partials,
                    failed: false,
                },
                Err(err) => self.content_failed(response.status, &err),
            },
            Err(err) => self.content_failed(err.status().unwrap_or(0), &err),
        }
    }

    /// Fetch the fragment's standalone document (PREVIEW mode).
    pub async fn get_content_preview(
        &self,
        req: &FragmentRequest,
        attributes: &BTreeMap<String, String>,
    ) -> FragmentContent<String> {
        let Some(snapshot) = self.snapshot() else {
            return self.content_failed(0, &FetchError::NotConfigured(self.name.clone()));
        };
        match self.fetch_content(&snapshot, req, attributes, RenderMode::Preview).await {
            Ok(response) => match response.text() {
                Ok(html) => FragmentContent {
                    status: response.status,
                    headers: response.headers,
                    html,
                    failed: false,
                },
                Err(err) => self.content_failed(response.status, &err),
            },
            Err(err) => self.content_failed(err.status().unwrap_or(0), &err),
        }
    }

    async fn fetch_content(
        &self,
        snapshot: &Snapshot,
        req: &FragmentRequest,
        attributes: &BTreeMap<String, String>,
        mode: RenderMode,
    ) -> Result<FetchResponse, FetchError> {
        let mut request =
            FetchRequest::get(snapshot.url(&snapshot.config.render.url)).query(RENDER_MODE_QUERY, mode.as_str());
        for (name, value) in attributes {
            if name == RENDER_MODE_QUERY {
                continue;
            }
            request = request.query(name, value);
        }
        if let Some(cookie) = req.header("cookie") {
            request = request.cookies(cookie);
        }

        fetch_ok(self.client.as_ref(), request).await
    }

    fn content_failed<T: Default>(&self, status: u16, err: &FetchError) -> FragmentContent<T> {
        tracing::warn!(fragment = %self.name, status, error = %err, "fragment content unavailable");
        FragmentContent::failed(status)
    }

    /// Fetch the placeholder markup. Never fails: returns `""` instead.
    pub async fn get_placeholder(&self, req: &FragmentRequest) -> String {
        match self.snapshot() {
            Some(snapshot) => self.placeholder_from(&snapshot, req).await,
            None => String::new(),
        }
    }

    pub(crate) async fn placeholder_from(&self, snapshot: &Snapshot, req: &FragmentRequest) -> String {
        if !snapshot.config.render.placeholder {
            return String::new();
        }

        let mut request = FetchRequest::get(snapshot.url(&format!("/{}/placeholder", self.name)));
        if let Some(cookie) = req.header("cookie") {
            request = request.cookies(cookie);
        }

        let result = fetch_ok(self.client.as_ref(), request)
            .await
            .and_then(|response| response.text());
        match result {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!(fragment = %self.name, error = %err, "placeholder unavailable");
                String::new()
            }
        }
    }

    /// Fetch the body of an asset declared by the active version.
    #[tracing::instrument(skip(self, req), fields(fragment = %self.name))]
    pub async fn get_asset(&self, req: &FragmentRequest, name: &str) -> Result<String, StorefrontError> {
        let snapshot = self.configured()?;
        let active = active_version(&snapshot.config, req);
        let asset = find_asset(&snapshot.config, active, |asset| asset.name == name)
            .ok_or_else(|| self.asset_not_found(name))?;

        self.asset_from(&snapshot, active, asset).await
    }

    /// Fetch a static file of the active version by its file name.
    ///
    /// Returns the asset's type along with the body.
    pub async fn get_static(
        &self,
        req: &FragmentRequest,
        file_name: &str,
    ) -> Result<(AssetType, String), StorefrontError> {
        let snapshot = self.configured()?;
        let active = active_version(&snapshot.config, req);
        let asset = find_asset(&snapshot.config, active, |asset| asset.file_name == file_name)
            .ok_or_else(|| self.asset_not_found(file_name))?;

        let body = self.asset_from(&snapshot, active, asset).await?;
        Ok((asset.kind, body))
    }

    /// Fetch an asset of `version` from the owner named in `snapshot`.
    pub(crate) async fn asset_from(
        &self,
        snapshot: &Snapshot,
        version: &str,
        asset: &AssetDescriptor,
    ) -> Result<String, StorefrontError> {
        let request = FetchRequest::get(snapshot.url(&format!("/{}/static/{}", self.name, asset.file_name)))
            .query(VERSION_QUERY, version)
            .cookies(format!("{}={}", snapshot.config.test_cookie, version));

        let response = fetch_ok(self.client.as_ref(), request).await?;
        Ok(response.text()?)
    }

    fn configured(&self) -> Result<Arc<Snapshot>, FetchError> {
        self.snapshot()
            .ok_or_else(|| FetchError::NotConfigured(self.name.clone()))
    }

    fn asset_not_found(&self, asset: &str) -> FragmentError {
        FragmentError::AssetNotFound {
            fragment: self.name.clone(),
            asset: asset.to_string(),
        }
    }
}

impl std::fmt::Debug for FragmentStorefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentStorefront")
            .field("name", &self.name)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

pub(crate) fn active_version<'a>(config: &'a ExposeFragment, req: &'a FragmentRequest) -> &'a str {
    config.resolve_version([req.query_param(VERSION_QUERY), req.cookie(&config.test_cookie)])
}

/// The last declaration of `version` matching `pred`.
fn find_asset<'a>(
    config: &'a ExposeFragment,
    version: &str,
    pred: impl Fn(&AssetDescriptor) -> bool,
) -> Option<&'a AssetDescriptor> {
    config.version_assets(version).iter().rev().find(|asset| pred(*asset))
}
