//! Static assets and dependencies declared by a fragment version.

use serde::{Deserialize, Serialize};

/// Where an asset tag is injected in the composed page.
///
/// Variant order is the injection order used by the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetLocation {
    /// Inside `<head>`, after the title.
    Head,
    /// Directly before the fragment's content.
    ContentStart,
    /// Directly after the fragment's content.
    ContentEnd,
    /// Right after the opening `<body>` tag.
    BodyStart,
    /// Right before the closing `</body>` tag.
    BodyEnd,
}

impl AssetLocation {
    /// All locations in injection order.
    pub const ALL: [AssetLocation; 5] = [
        Self::Head,
        Self::ContentStart,
        Self::ContentEnd,
        Self::BodyStart,
        Self::BodyEnd,
    ];

    /// Wire name of this location.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::ContentStart => "CONTENT_START",
            Self::ContentEnd => "CONTENT_END",
            Self::BodyStart => "BODY_START",
            Self::BodyEnd => "BODY_END",
        }
    }
}

impl std::fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an asset reaches the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InjectType {
    /// Referenced by URL from the fragment's static route.
    External,
    /// Content embedded directly into the tag.
    Inline,
}

/// Asset content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Js,
    Css,
}

impl AssetType {
    /// MIME type served for this asset type.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Js => "application/javascript; charset=utf-8",
            Self::Css => "text/css; charset=utf-8",
        }
    }
}

/// A static asset declared by a fragment version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    /// Key used for out-of-band retrieval.
    pub name: String,
    /// File served from the fragment's static route.
    pub file_name: String,
    /// Injection location.
    pub location: AssetLocation,
    /// External reference or inline content.
    pub inject_type: InjectType,
    /// Script or stylesheet.
    #[serde(rename = "type")]
    pub kind: AssetType,
}

impl AssetDescriptor {
    /// Create an external asset.
    pub fn external(
        name: impl Into<String>,
        file_name: impl Into<String>,
        location: AssetLocation,
        kind: AssetType,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            location,
            inject_type: InjectType::External,
            kind,
        }
    }

    /// Create an inline asset.
    pub fn inline(
        name: impl Into<String>,
        file_name: impl Into<String>,
        location: AssetLocation,
        kind: AssetType,
    ) -> Self {
        Self {
            inject_type: InjectType::Inline,
            ..Self::external(name, file_name, location, kind)
        }
    }
}

/// A client-side library a fragment version relies on. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDescriptor {
    /// Library name.
    pub name: String,
    /// Where the library is loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Link used in preview documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_order_matches_injection_order() {
        let mut shuffled = vec![
            AssetLocation::BodyEnd,
            AssetLocation::Head,
            AssetLocation::ContentEnd,
            AssetLocation::BodyStart,
            AssetLocation::ContentStart,
        ];
        shuffled.sort();
        assert_eq!(shuffled, AssetLocation::ALL.to_vec());
    }

    #[test]
    fn test_descriptor_wire_format() {
        let asset = AssetDescriptor::external(
            "bundle",
            "bundle.min.js",
            AssetLocation::BodyEnd,
            AssetType::Js,
        );
        let json = serde_json::to_value(&asset).unwrap();

        assert_eq!(json["fileName"], "bundle.min.js");
        assert_eq!(json["location"], "BODY_END");
        assert_eq!(json["injectType"], "EXTERNAL");
        assert_eq!(json["type"], "JS");
    }

    #[test]
    fn test_unknown_location_rejected() {
        let raw = r#"{"name":"a","fileName":"a.js","location":"FOOTER","injectType":"EXTERNAL","type":"JS"}"#;
        let parsed: Result<AssetDescriptor, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_inline_constructor() {
        let asset = AssetDescriptor::inline("critical", "critical.css", AssetLocation::Head, AssetType::Css);
        assert_eq!(asset.inject_type, InjectType::Inline);
        assert_eq!(asset.file_name, "critical.css");
    }
}
