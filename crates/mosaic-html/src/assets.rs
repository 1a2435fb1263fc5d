//! Asset collection and tag rendering.

use std::collections::{BTreeMap, HashMap};

use mosaic_core::{AssetDescriptor, AssetLocation, AssetType, InjectType, VERSION_QUERY};
use serde::Serialize;

use crate::escape::html_escape;

/// Content lookup for inline assets.
pub trait InlineSource {
    /// Literal content of an inline asset, if available.
    fn inline_content(&self, asset: &AssetDescriptor) -> Option<String>;
}

/// Inline contents keyed by asset name.
impl InlineSource for BTreeMap<String, String> {
    fn inline_content(&self, asset: &AssetDescriptor) -> Option<String> {
        self.get(&asset.name).cloned()
    }
}

/// Source with no inline content at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInlineContent;

impl InlineSource for NoInlineContent {
    fn inline_content(&self, _asset: &AssetDescriptor) -> Option<String> {
        None
    }
}

/// Rendered asset tags grouped by location, in injection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssetTags(BTreeMap<AssetLocation, Vec<String>>);

impl AssetTags {
    /// Tags for a location, in declaration order.
    pub fn at(&self, location: AssetLocation) -> &[String] {
        self.0.get(&location).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether no tags were collected.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Total number of tags.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Iterate locations and their tags in injection order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetLocation, &[String])> {
        self.0.iter().map(|(location, tags)| (*location, tags.as_slice()))
    }

    fn push(&mut self, location: AssetLocation, tag: String) {
        self.0.entry(location).or_default().push(tag);
    }
}

/// Static route of a fragment asset, qualified with the version it belongs to.
///
/// The owner honors the version query ahead of the version cookie, so the
/// URL alone identifies the asset body.
pub fn static_url(fragment: &str, file_name: &str, version: &str) -> String {
    format!(
        "/{}/static/{}?{}={}",
        fragment, file_name, VERSION_QUERY, version
    )
}

/// Drop earlier declarations of a repeated asset name.
///
/// The surviving declaration keeps its own position.
pub fn dedupe_assets(assets: &[AssetDescriptor]) -> Vec<&AssetDescriptor> {
    let last_index: HashMap<&str, usize> = assets
        .iter()
        .enumerate()
        .map(|(i, asset)| (asset.name.as_str(), i))
        .collect();

    assets
        .iter()
        .enumerate()
        .filter(|(i, asset)| last_index.get(asset.name.as_str()) == Some(i))
        .map(|(_, asset)| asset)
        .collect()
}

/// Render one asset tag. Inline assets without content render nothing.
pub fn render_tag(
    fragment: &str,
    version: &str,
    asset: &AssetDescriptor,
    inline: &dyn InlineSource,
) -> Option<String> {
    match asset.inject_type {
        InjectType::External => {
            let url = html_escape(&static_url(fragment, &asset.file_name, version));
            Some(match asset.kind {
                AssetType::Js => format!(r#"<script src="{}" type="text/javascript"></script>"#, url),
                AssetType::Css => format!(r#"<link rel="stylesheet" href="{}">"#, url),
            })
        }
        InjectType::Inline => {
            let content = inline.inline_content(asset)?;
            Some(match asset.kind {
                AssetType::Js => format!("<script>{}</script>", content),
                AssetType::Css => format!("<style>{}</style>", content),
            })
        }
    }
}

/// Collect the injection tags of one fragment version.
///
/// Pure: the same inputs always produce the same tags.
pub fn collect_assets(
    fragment: &str,
    version: &str,
    assets: &[AssetDescriptor],
    inline: &dyn InlineSource,
) -> AssetTags {
    let mut tags = AssetTags::default();

    for asset in dedupe_assets(assets) {
        match render_tag(fragment, version, asset, inline) {
            Some(tag) => tags.push(asset.location, tag),
            None => tracing::warn!(
                fragment,
                version,
                asset = %asset.name,
                "inline asset has no content, skipping"
            ),
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn js(name: &str, file: &str, location: AssetLocation) -> AssetDescriptor {
        AssetDescriptor::external(name, file, location, AssetType::Js)
    }

    // === Tag Rendering Tests ===

    #[test]
    fn test_external_tags() {
        let script = js("bundle", "bundle.js", AssetLocation::BodyEnd);
        let style = AssetDescriptor::external("theme", "theme.css", AssetLocation::Head, AssetType::Css);

        assert_eq!(
            render_tag("product", "1.0.0", &script, &NoInlineContent).unwrap(),
            r#"<script src="/product/static/bundle.js?__version=1.0.0" type="text/javascript"></script>"#
        );
        assert_eq!(
            render_tag("product", "1.0.0", &style, &NoInlineContent).unwrap(),
            r#"<link rel="stylesheet" href="/product/static/theme.css?__version=1.0.0">"#
        );
    }

    #[test]
    fn test_inline_tags_carry_content() {
        let mut inline = BTreeMap::new();
        inline.insert("critical".to_string(), "body{margin:0}".to_string());
        let asset = AssetDescriptor::inline("critical", "critical.css", AssetLocation::Head, AssetType::Css);

        assert_eq!(
            render_tag("product", "1.0.0", &asset, &inline).unwrap(),
            "<style>body{margin:0}</style>"
        );
    }

    #[test]
    fn test_inline_without_content_is_skipped() {
        let asset = AssetDescriptor::inline("boot", "boot.js", AssetLocation::BodyStart, AssetType::Js);
        let tags = collect_assets("product", "1.0.0", &[asset], &NoInlineContent);
        assert!(tags.is_empty());
    }

    // === Collection Tests ===

    #[test]
    fn test_grouped_by_location_in_declaration_order() {
        let assets = vec![
            js("a", "a.js", AssetLocation::BodyEnd),
            js("b", "b.js", AssetLocation::Head),
            js("c", "c.js", AssetLocation::BodyEnd),
        ];
        let tags = collect_assets("product", "1.0.0", &assets, &NoInlineContent);

        assert_eq!(tags.len(), 3);
        assert_eq!(tags.at(AssetLocation::Head).len(), 1);
        let body_end = tags.at(AssetLocation::BodyEnd);
        assert!(body_end[0].contains("a.js"));
        assert!(body_end[1].contains("c.js"));

        let order: Vec<AssetLocation> = tags.iter().map(|(location, _)| location).collect();
        assert_eq!(order, vec![AssetLocation::Head, AssetLocation::BodyEnd]);
    }

    #[test]
    fn test_duplicate_name_later_wins() {
        let assets = vec![
            js("bundle", "old.js", AssetLocation::BodyEnd),
            js("other", "other.js", AssetLocation::BodyEnd),
            js("bundle", "new.js", AssetLocation::BodyEnd),
        ];
        let tags = collect_assets("product", "1.0.0", &assets, &NoInlineContent);
        let body_end = tags.at(AssetLocation::BodyEnd);

        assert_eq!(body_end.len(), 2);
        assert!(body_end[0].contains("other.js"));
        assert!(body_end[1].contains("new.js"));
        assert!(!body_end.iter().any(|t| t.contains("old.js")));
    }

    #[test]
    fn test_collection_is_idempotent() {
        let assets = vec![
            js("bundle", "old.js", AssetLocation::Head),
            js("bundle", "new.js", AssetLocation::BodyEnd),
        ];
        let first = collect_assets("product", "1.0.0", &assets, &NoInlineContent);
        let second = collect_assets("product", "1.0.0", &assets, &NoInlineContent);
        assert_eq!(first, second);
        assert!(first.at(AssetLocation::Head).is_empty());
    }

    #[test]
    fn test_tags_serialize_by_location_name() {
        let assets = vec![js("a", "a.js", AssetLocation::ContentStart)];
        let tags = collect_assets("product", "1.0.0", &assets, &NoInlineContent);
        let json = serde_json::to_value(&tags).unwrap();
        assert!(json["CONTENT_START"].is_array());
    }
}
