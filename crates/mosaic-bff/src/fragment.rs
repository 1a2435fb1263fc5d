//! Version-aware fragment rendering on the owner side.

use std::collections::BTreeMap;
use std::sync::Arc;

use mosaic_core::{
    AssetType, ExposeFragment, FragmentError, FragmentManifest, FragmentRequest, Partials,
    VersionManifest, VersionSelector, VersionSource, MAIN_PARTIAL, VERSION_QUERY,
};
use mosaic_html::{collect_assets, PageDocument};

use crate::handler::Handler;
use crate::source::{AssetSource, StaticFiles, VersionInline};

/// A declared version paired with its handler.
#[derive(Debug, Clone)]
struct FragmentVersion {
    manifest: VersionManifest,
    handler: Handler,
}

/// A static asset body resolved for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAsset {
    /// Version the body belongs to.
    pub version: String,
    /// Asset kind, which decides the content type.
    pub kind: AssetType,
    /// File contents.
    pub body: String,
    /// What selected the version.
    pub source: VersionSource,
}

impl StaticAsset {
    /// Whether the URL alone identifies this body.
    pub fn is_pinned_by_url(&self) -> bool {
        self.source == VersionSource::Override
    }

    /// `Cache-Control` value for serving this body.
    pub fn cache_control(&self) -> &'static str {
        if self.is_pinned_by_url() {
            "public, max-age=31536000, immutable"
        } else {
            "private, max-age=0"
        }
    }
}

/// An owned fragment: manifest, per-version handlers and asset files.
pub struct Fragment {
    manifest: FragmentManifest,
    versions: BTreeMap<String, FragmentVersion>,
    assets: Arc<dyn AssetSource>,
}

impl Fragment {
    /// Create a fragment, checking every declared version has the
    /// handlers it needs.
    pub fn new(
        manifest: FragmentManifest,
        mut handlers: BTreeMap<String, Handler>,
        assets: Arc<dyn AssetSource>,
    ) -> Result<Self, FragmentError> {
        manifest.validate()?;

        let mut versions = BTreeMap::new();
        for (id, declared) in &manifest.versions {
            let handler = handlers
                .remove(id)
                .ok_or_else(|| FragmentError::MissingHandler {
                    fragment: manifest.name.clone(),
                    version: id.clone(),
                })?;

            if !manifest.render.is_static && !handler.has_data() {
                return Err(FragmentError::MissingDataHandler {
                    fragment: manifest.name.clone(),
                    version: id.clone(),
                });
            }

            versions.insert(
                id.clone(),
                FragmentVersion {
                    manifest: declared.clone(),
                    handler,
                },
            );
        }

        for id in handlers.keys() {
            tracing::warn!(
                fragment = %manifest.name,
                version = %id,
                "handler registered for an undeclared version, ignoring"
            );
        }

        Ok(Self {
            manifest,
            versions,
            assets,
        })
    }

    /// Create a fragment using the builder.
    pub fn builder(manifest: FragmentManifest) -> FragmentBuilder {
        FragmentBuilder::new(manifest)
    }

    /// Fragment name.
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// Fragment manifest.
    pub fn manifest(&self) -> &FragmentManifest {
        &self.manifest
    }

    /// The composer-facing view of this fragment.
    pub fn expose(&self) -> Result<ExposeFragment, FragmentError> {
        ExposeFragment::from_manifest(&self.manifest)
    }

    fn selector(&self) -> VersionSelector<'_> {
        VersionSelector::for_manifest(&self.manifest)
    }

    /// Render the partials of the selected version.
    ///
    /// Static fragments skip the data step entirely.
    #[tracing::instrument(skip_all, fields(fragment = %self.manifest.name, request_id = %req.request_id))]
    pub async fn render(
        &self,
        req: &FragmentRequest,
        version_override: Option<&str>,
    ) -> Result<Partials, FragmentError> {
        let resolved = self
            .selector()
            .resolve(&self.versions, &req.cookies, version_override)?;
        self.render_version(req, resolved.id, resolved.version).await
    }

    async fn render_version(
        &self,
        req: &FragmentRequest,
        id: &str,
        version: &FragmentVersion,
    ) -> Result<Partials, FragmentError> {
        tracing::debug!(version = id, "rendering fragment version");

        let data = if self.manifest.render.is_static {
            None
        } else {
            let handler = version
                .handler
                .data
                .as_ref()
                .ok_or_else(|| FragmentError::MissingDataHandler {
                    fragment: self.manifest.name.clone(),
                    version: id.to_string(),
                })?;
            let data = handler
                .data(req)
                .await
                .map_err(|source| self.render_failed(source))?;
            Some(data)
        };

        version
            .handler
            .content
            .content(req, data)
            .await
            .map_err(|source| self.render_failed(source))
    }

    fn render_failed(&self, source: anyhow::Error) -> FragmentError {
        FragmentError::RenderFailed {
            fragment: self.manifest.name.clone(),
            source,
        }
    }

    /// Render a standalone document of the selected version.
    pub async fn render_preview(
        &self,
        req: &FragmentRequest,
        version_override: Option<&str>,
    ) -> Result<String, FragmentError> {
        let resolved = self
            .selector()
            .resolve(&self.versions, &req.cookies, version_override)?;
        let partials = self.render_version(req, resolved.id, resolved.version).await?;

        let inline = VersionInline {
            source: self.assets.as_ref(),
            version: resolved.id,
        };
        let tags = collect_assets(
            &self.manifest.name,
            resolved.id,
            &resolved.version.manifest.assets,
            &inline,
        );

        let main = partials.get(MAIN_PARTIAL).map(String::as_str).unwrap_or("");
        let mut document = PageDocument::browsing(&self.manifest.name);
        document.push_fragment(main, &tags);
        Ok(document.render())
    }

    /// Placeholder markup of the selected version, or empty.
    pub fn placeholder(&self, req: &FragmentRequest) -> String {
        match self.selector().resolve(&self.versions, &req.cookies, None) {
            Ok(resolved) => resolved
                .version
                .handler
                .placeholder
                .as_ref()
                .map(|p| p.placeholder())
                .unwrap_or_default(),
            Err(err) => {
                tracing::warn!(fragment = %self.manifest.name, error = %err, "placeholder unavailable");
                String::new()
            }
        }
    }

    /// Resolve a static asset body.
    ///
    /// A `__version` query parameter takes precedence over the version
    /// cookie.
    pub fn static_asset(
        &self,
        req: &FragmentRequest,
        file_name: &str,
    ) -> Result<StaticAsset, FragmentError> {
        let resolved = self.selector().resolve(
            &self.versions,
            &req.cookies,
            req.query_param(VERSION_QUERY),
        )?;

        let not_found = || FragmentError::AssetNotFound {
            fragment: self.manifest.name.clone(),
            asset: file_name.to_string(),
        };

        let declared = resolved
            .version
            .manifest
            .assets
            .iter()
            .rev()
            .find(|asset| asset.file_name == file_name)
            .ok_or_else(not_found)?;
        let body = self
            .assets
            .read(resolved.id, file_name)
            .ok_or_else(not_found)?;

        Ok(StaticAsset {
            version: resolved.id.to_string(),
            kind: declared.kind,
            body,
            source: resolved.source,
        })
    }
}

impl std::fmt::Debug for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fragment")
            .field("manifest", &self.manifest)
            .field("versions", &self.versions)
            .finish_non_exhaustive()
    }
}

/// Builder for fragment definition.
pub struct FragmentBuilder {
    manifest: FragmentManifest,
    handlers: BTreeMap<String, Handler>,
    assets: Arc<dyn AssetSource>,
}

impl FragmentBuilder {
    /// Create a new fragment builder.
    pub fn new(manifest: FragmentManifest) -> Self {
        Self {
            manifest,
            handlers: BTreeMap::new(),
            assets: Arc::new(StaticFiles::new()),
        }
    }

    /// Register the handler of a version.
    pub fn version(mut self, id: impl Into<String>, handler: Handler) -> Self {
        self.handlers.insert(id.into(), handler);
        self
    }

    /// Set where asset files are read from.
    pub fn assets(mut self, source: impl AssetSource + 'static) -> Self {
        self.assets = Arc::new(source);
        self
    }

    /// Build the fragment.
    pub fn build(self) -> Result<Fragment, FragmentError> {
        Fragment::new(self.manifest, self.handlers, self.assets)
    }
}
