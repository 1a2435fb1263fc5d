//! CLI command implementations.

pub mod assets;
pub mod compose;
pub mod export;
pub mod validate;

use clap::{Args, ValueEnum};

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Write the export to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the assets command.
#[derive(Args)]
pub struct AssetsArgs {
    /// Fragment name.
    pub fragment: String,

    /// Version to inspect (default: the fragment's default version).
    #[arg(long)]
    pub version: Option<String>,
}

/// Render mode requested from the composer.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// A single HTML document.
    Preview,
    /// Partials and asset tags as JSON.
    Stream,
}

impl ModeArg {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Preview => mosaic_core::RenderMode::Preview.as_str(),
            Self::Stream => mosaic_core::RenderMode::Stream.as_str(),
        }
    }
}

/// Arguments for the compose command.
#[derive(Args)]
pub struct ComposeArgs {
    /// Storefront config file.
    #[arg(short, long, default_value = "storefront.toml")]
    pub storefront: String,

    /// Page name.
    #[arg(short, long)]
    pub page: String,

    /// Render mode.
    #[arg(short, long, value_enum, default_value = "preview")]
    pub mode: ModeArg,

    /// Cookie to send, as `name=value` (repeatable).
    #[arg(long = "cookie", value_parser = parse_cookie)]
    pub cookies: Vec<(String, String)>,
}

fn parse_cookie(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookie() {
        assert_eq!(
            parse_cookie("product-cookie=1.0.1").unwrap(),
            ("product-cookie".to_string(), "1.0.1".to_string())
        );
        assert!(parse_cookie("no-equals").is_err());
        assert!(parse_cookie("=1.0.1").is_err());
    }
}
