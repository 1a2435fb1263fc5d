//! Storefront configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use mosaic_fetch::TimeoutConfig;
use serde::{Deserialize, Serialize};

/// A fragment owner the storefront polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway name.
    pub name: String,
    /// Base URL of the owner.
    pub url: String,
}

/// A fragment placed on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFragment {
    /// Fragment name.
    pub name: String,
    /// Gateway serving it.
    pub gateway: String,
}

/// A composed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page name.
    pub name: String,
    /// Route the page is served on.
    pub url: String,
    /// Fragments in placement order.
    #[serde(default)]
    pub fragments: Vec<PageFragment>,
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Total timeout of each upstream fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl HttpSettings {
    /// Timeouts for the HTTP client.
    pub fn timeouts(&self) -> TimeoutConfig {
        self.timeout_ms
            .map(|ms| TimeoutConfig::from_total(Duration::from_millis(ms)))
            .unwrap_or_default()
    }
}

/// Storefront configuration file (`storefront.toml` or `.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Gateways to poll.
    #[serde(default)]
    pub gateways: Vec<GatewayConfig>,
    /// Pages to serve.
    #[serde(default)]
    pub pages: Vec<PageConfig>,
    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpSettings,
}

impl StorefrontConfig {
    /// Load config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read storefront config: {}", path.display()))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            gateways = config.gateways.len(),
            pages = config.pages.len(),
            "storefront config loaded"
        );
        Ok(config)
    }

    /// Parse a TOML config.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Check that names are unique and every page references a known gateway.
    ///
    /// A fragment may appear at most once per page.
    pub fn validate(&self) -> Result<()> {
        for (i, gateway) in self.gateways.iter().enumerate() {
            if self.gateways[..i].iter().any(|g| g.name == gateway.name) {
                bail!("duplicate gateway name '{}'", gateway.name);
            }
        }

        for (i, page) in self.pages.iter().enumerate() {
            if self.pages[..i].iter().any(|p| p.name == page.name || p.url == page.url) {
                bail!("page '{}' duplicates the name or url of another page", page.name);
            }
            if !page.url.starts_with('/') {
                bail!("url '{}' of page '{}' must start with '/'", page.url, page.name);
            }
            for (j, fragment) in page.fragments.iter().enumerate() {
                if page.fragments[..j].iter().any(|f| f.name == fragment.name) {
                    bail!("page '{}' lists fragment '{}' more than once", page.name, fragment.name);
                }
                if self.gateway(&fragment.gateway).is_none() {
                    bail!(
                        "page '{}' references unknown gateway '{}'",
                        page.name,
                        fragment.gateway
                    );
                }
            }
        }

        Ok(())
    }

    /// Find a gateway by name.
    pub fn gateway(&self, name: &str) -> Option<&GatewayConfig> {
        self.gateways.iter().find(|g| g.name == name)
    }

    /// Find a page by name.
    pub fn page(&self, name: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[[gateways]]
name = "browsing"
url = "http://localhost:4446"

[[pages]]
name = "product-detail"
url = "/product"
fragments = [{ name = "header", gateway = "browsing" }, { name = "product", gateway = "browsing" }]

[http]
timeout_ms = 800
"#;

    #[test]
    fn test_parse_toml() {
        let config = StorefrontConfig::from_toml(CONFIG).unwrap();

        assert_eq!(config.gateways.len(), 1);
        let page = config.page("product-detail").unwrap();
        assert_eq!(page.fragments[1].name, "product");
        assert_eq!(config.http.timeouts().total, Duration::from_millis(800));
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_toml("").unwrap();
        assert!(config.pages.is_empty());
        assert_eq!(config.http.timeouts(), TimeoutConfig::default());
    }

    #[test]
    fn test_unknown_gateway_rejected() {
        let content = CONFIG.replace(r#"gateway = "browsing" }]"#, r#"gateway = "search" }]"#);
        let err = StorefrontConfig::from_toml(&content).unwrap_err();
        assert!(err.to_string().contains("unknown gateway 'search'"));
    }

    #[test]
    fn test_duplicate_gateway_rejected() {
        let content = format!("{}\n[[gateways]]\nname = \"browsing\"\nurl = \"http://x\"\n", CONFIG);
        assert!(StorefrontConfig::from_toml(&content).is_err());
    }

    #[test]
    fn test_duplicate_fragment_on_page_rejected() {
        let content = CONFIG.replace(
            r#"{ name = "header", gateway = "browsing" }"#,
            r#"{ name = "product", gateway = "browsing" }"#,
        );
        let err = StorefrontConfig::from_toml(&content).unwrap_err();
        assert!(err.to_string().contains("lists fragment 'product' more than once"));
    }

    #[test]
    fn test_load_json_by_extension() {
        let config = StorefrontConfig::from_toml(CONFIG).unwrap();
        let path = std::env::temp_dir().join(format!("mosaic-storefront-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = StorefrontConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
