//! Wire contract between fragment owners and composers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::asset::{AssetDescriptor, DependencyDescriptor};
use crate::error::FragmentError;
use crate::manifest::{FragmentManifest, GatewayManifest, RenderConfig};

/// The part of a fragment's configuration a composer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposeFragment {
    /// Default version id on the owner.
    pub version: String,
    /// Cookie that pins a version.
    pub test_cookie: String,
    /// Assets of the default version.
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
    /// Dependencies of the default version.
    #[serde(default)]
    pub dependencies: Vec<DependencyDescriptor>,
    /// Render endpoint configuration.
    pub render: RenderConfig,
    /// Assets of every deployed version, by version id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub versions: BTreeMap<String, Vec<AssetDescriptor>>,
}

impl ExposeFragment {
    /// Expose the default version of a manifest.
    pub fn from_manifest(manifest: &FragmentManifest) -> Result<Self, FragmentError> {
        let current = manifest.current()?;
        Ok(Self {
            version: manifest.version.clone(),
            test_cookie: manifest.test_cookie.clone(),
            assets: current.assets.clone(),
            dependencies: current.dependencies.clone(),
            render: manifest.render.clone(),
            versions: manifest
                .versions
                .iter()
                .map(|(id, version)| (id.clone(), version.assets.clone()))
                .collect(),
        })
    }

    /// Declare the assets of a deployed version.
    pub fn with_version(mut self, id: impl Into<String>, assets: Vec<AssetDescriptor>) -> Self {
        self.versions.insert(id.into(), assets);
        self
    }

    /// Whether the owner deploys a version.
    pub fn has_version(&self, id: &str) -> bool {
        id == self.version || self.versions.contains_key(id)
    }

    /// The first candidate the owner deploys, else the default version.
    pub fn resolve_version<'a>(&'a self, candidates: impl IntoIterator<Item = Option<&'a str>>) -> &'a str {
        candidates
            .into_iter()
            .flatten()
            .find(|id| self.has_version(id))
            .unwrap_or(&self.version)
    }

    /// Assets declared by a version. Unknown ids get the default version's.
    pub fn version_assets(&self, id: &str) -> &[AssetDescriptor] {
        self.versions.get(id).unwrap_or(&self.assets)
    }

    /// Find an asset of the default version by name. The last declaration wins.
    pub fn asset(&self, name: &str) -> Option<&AssetDescriptor> {
        self.assets.iter().rev().find(|a| a.name == name)
    }
}

/// Self-description document served at an owner's root route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayExport {
    /// Gateway name.
    pub name: String,
    /// Public base URL.
    pub url: String,
    /// Exposed fragments by name.
    pub fragments: BTreeMap<String, ExposeFragment>,
    /// Content hash of `fragments`.
    pub hash: String,
}

impl GatewayExport {
    /// Build an export and compute its hash.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        fragments: BTreeMap<String, ExposeFragment>,
    ) -> Self {
        let hash = content_hash(&fragments);
        Self {
            name: name.into(),
            url: url.into(),
            fragments,
            hash,
        }
    }

    /// Build the export for a whole gateway manifest.
    pub fn from_manifest(manifest: &GatewayManifest) -> Result<Self, FragmentError> {
        let fragments = manifest
            .fragments
            .iter()
            .map(|f| Ok((f.name.clone(), ExposeFragment::from_manifest(f)?)))
            .collect::<Result<BTreeMap<_, _>, FragmentError>>()?;

        Ok(Self::new(&manifest.gateway.name, &manifest.gateway.url, fragments))
    }

    /// Check that `hash` matches the fragments it claims to describe.
    pub fn verify(&self) -> bool {
        content_hash(&self.fragments) == self.hash
    }
}

/// SHA-256 of the canonical JSON encoding, hex encoded.
pub fn content_hash<T: Serialize>(value: &T) -> String {
    // Serializing ordered maps of plain structs cannot fail.
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}
