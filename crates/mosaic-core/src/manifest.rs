//! Owner-side fragment and gateway configuration.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::asset::{AssetDescriptor, DependencyDescriptor};
use crate::error::FragmentError;

/// Render endpoint configuration for a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Content route on the owner (e.g. `/product`).
    pub url: String,
    /// Static fragments never fetch data.
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    /// Whether composers may show the placeholder on failure.
    #[serde(default, skip_serializing_if = "is_false")]
    pub placeholder: bool,
}

impl RenderConfig {
    /// Create a render config for a route.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_static: false,
            placeholder: false,
        }
    }

    /// Mark the fragment as static.
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Enable or disable placeholders.
    pub fn with_placeholder(mut self, placeholder: bool) -> Self {
        self.placeholder = placeholder;
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Declarative half of a fragment version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionManifest {
    /// Assets in declaration order.
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
    /// Client-side dependencies in declaration order.
    #[serde(default)]
    pub dependencies: Vec<DependencyDescriptor>,
}

impl VersionManifest {
    /// Add an asset.
    pub fn with_asset(mut self, asset: AssetDescriptor) -> Self {
        self.assets.push(asset);
        self
    }

    /// Add a dependency.
    pub fn with_dependency(mut self, dependency: DependencyDescriptor) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

/// Owner-side configuration of one fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentManifest {
    /// Stable fragment name.
    pub name: String,
    /// Default version id.
    pub version: String,
    /// Cookie that pins a version for a client.
    pub test_cookie: String,
    /// Render endpoint configuration.
    pub render: RenderConfig,
    /// Deployable versions by id.
    pub versions: BTreeMap<String, VersionManifest>,
}

impl FragmentManifest {
    /// Create a manifest with a single default version.
    pub fn new(name: impl Into<String>, version: impl Into<String>, render: RenderConfig) -> Self {
        let name = name.into();
        let version = version.into();
        let mut versions = BTreeMap::new();
        versions.insert(version.clone(), VersionManifest::default());

        Self {
            test_cookie: format!("{}-cookie", name),
            name,
            version,
            render,
            versions,
        }
    }

    /// Set the version cookie name.
    pub fn with_test_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.test_cookie = cookie.into();
        self
    }

    /// Add or replace a version.
    pub fn with_version(mut self, id: impl Into<String>, version: VersionManifest) -> Self {
        self.versions.insert(id.into(), version);
        self
    }

    /// Declared manifest of the default version.
    pub fn current(&self) -> Result<&VersionManifest, FragmentError> {
        self.versions
            .get(&self.version)
            .ok_or_else(|| FragmentError::version_not_found(&self.name, &self.version))
    }

    /// Check the structural invariants of this manifest.
    pub fn validate(&self) -> Result<(), FragmentError> {
        if self.name.is_empty() || self.name.contains('/') {
            return Err(FragmentError::InvalidManifest(format!(
                "fragment name '{}' must be non-empty and contain no '/'",
                self.name
            )));
        }
        if !self.render.url.starts_with('/') {
            return Err(FragmentError::InvalidManifest(format!(
                "render url '{}' of fragment {} must start with '/'",
                self.render.url, self.name
            )));
        }
        if self.test_cookie.is_empty() {
            return Err(FragmentError::InvalidManifest(format!(
                "fragment {} has an empty test cookie",
                self.name
            )));
        }
        self.current()?;
        Ok(())
    }
}

/// Identity of an owner process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayIdentity {
    /// Gateway name.
    pub name: String,
    /// Public base URL composers use.
    pub url: String,
}

/// Configuration file of an owner process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayManifest {
    /// Gateway identity.
    pub gateway: GatewayIdentity,
    /// Fragments served by this gateway.
    #[serde(default)]
    pub fragments: Vec<FragmentManifest>,
}

impl GatewayManifest {
    /// Load a manifest from a TOML or JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        let manifest = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)
                .with_context(|| format!("Failed to parse JSON manifest: {}", path.display()))?
        } else {
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse TOML manifest: {}", path.display()))?
        };

        tracing::debug!(path = %path.display(), fragments = manifest.fragments.len(), "manifest loaded");
        Ok(manifest)
    }

    /// Parse and validate a TOML manifest.
    pub fn from_toml(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse and validate a JSON manifest.
    pub fn from_json(content: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate every fragment and reject duplicate names.
    pub fn validate(&self) -> Result<(), FragmentError> {
        let mut seen = std::collections::BTreeSet::new();
        for fragment in &self.fragments {
            fragment.validate()?;
            if !seen.insert(fragment.name.as_str()) {
                return Err(FragmentError::InvalidManifest(format!(
                    "fragment {} declared twice",
                    fragment.name
                )));
            }
        }
        Ok(())
    }

    /// Find a fragment by name.
    pub fn fragment(&self, name: &str) -> Option<&FragmentManifest> {
        self.fragments.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetLocation, AssetType, InjectType};

    const MANIFEST: &str = r#"
[gateway]
name = "catalog"
url = "http://localhost:4444"

[[fragments]]
name = "product"
version = "1.0.0"
testCookie = "product-cookie"

[fragments.render]
url = "/product"
placeholder = true

[fragments.versions."1.0.0"]
assets = [
    { name = "product-js", fileName = "product.js", location = "BODY_END", injectType = "EXTERNAL", type = "JS" },
]

[fragments.versions."1.0.1"]
assets = [
    { name = "product-js", fileName = "product.1.js", location = "BODY_END", injectType = "EXTERNAL", type = "JS" },
    { name = "product-css", fileName = "product.css", location = "HEAD", injectType = "INLINE", type = "CSS" },
]
"#;

    // === Parsing Tests ===

    #[test]
    fn test_parse_toml_manifest() {
        let manifest = GatewayManifest::from_toml(MANIFEST).unwrap();
        let product = manifest.fragment("product").unwrap();

        assert_eq!(manifest.gateway.name, "catalog");
        assert_eq!(product.test_cookie, "product-cookie");
        assert!(product.render.placeholder);
        assert!(!product.render.is_static);
        assert_eq!(product.versions.len(), 2);

        let css = &product.versions["1.0.1"].assets[1];
        assert_eq!(css.location, AssetLocation::Head);
        assert_eq!(css.inject_type, InjectType::Inline);
        assert_eq!(css.kind, AssetType::Css);
    }

    #[test]
    fn test_json_round_trip_keeps_wire_names() {
        let manifest = GatewayManifest::from_toml(MANIFEST).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains("\"testCookie\":\"product-cookie\""));
        assert!(!json.contains("\"static\""));

        let parsed = GatewayManifest::from_json(&json).unwrap();
        assert_eq!(parsed, manifest);
    }

    // === Validation Tests ===

    #[test]
    fn test_default_version_must_exist() {
        let mut fragment = FragmentManifest::new("product", "1.0.0", RenderConfig::new("/product"));
        fragment.version = "2.0.0".to_string();

        let err = fragment.validate().unwrap_err();
        assert!(matches!(err, FragmentError::VersionNotFound { .. }));
    }

    #[test]
    fn test_render_url_must_be_absolute() {
        let fragment = FragmentManifest::new("product", "1.0.0", RenderConfig::new("product"));
        assert!(matches!(
            fragment.validate(),
            Err(FragmentError::InvalidManifest(_))
        ));
    }

    #[test]
    fn test_duplicate_fragment_names_rejected() {
        let fragment = FragmentManifest::new("product", "1.0.0", RenderConfig::new("/product"));
        let manifest = GatewayManifest {
            gateway: GatewayIdentity {
                name: "catalog".into(),
                url: "http://localhost".into(),
            },
            fragments: vec![fragment.clone(), fragment],
        };
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_default_test_cookie() {
        let fragment = FragmentManifest::new("product", "1.0.0", RenderConfig::new("/product"));
        assert_eq!(fragment.test_cookie, "product-cookie");
    }
}
