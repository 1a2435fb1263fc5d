//! Page document assembly with location-based asset placement.

use mosaic_core::AssetLocation;

use crate::assets::AssetTags;
use crate::escape::html_escape;

/// A single HTML document assembled from one or more fragments.
///
/// Tags land in location order, then fragment order, then declaration
/// order. No whitespace is added between parts, so equal inputs always
/// render byte-identical documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDocument {
    title: String,
    head: Vec<String>,
    body_start: Vec<String>,
    content: Vec<String>,
    body_end: Vec<String>,
}

impl PageDocument {
    /// Create an empty document with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Create the preview document of a page or fragment.
    pub fn browsing(name: &str) -> Self {
        Self::new(format!("Browsing - {}", name))
    }

    /// Append a fragment's main partial and its asset tags.
    pub fn push_fragment(&mut self, main: &str, tags: &AssetTags) {
        self.head.extend_from_slice(tags.at(AssetLocation::Head));
        self.body_start.extend_from_slice(tags.at(AssetLocation::BodyStart));

        let mut content = String::new();
        for tag in tags.at(AssetLocation::ContentStart) {
            content.push_str(tag);
        }
        content.push_str(main);
        for tag in tags.at(AssetLocation::ContentEnd) {
            content.push_str(tag);
        }
        self.content.push(content);

        self.body_end.extend_from_slice(tags.at(AssetLocation::BodyEnd));
    }

    /// Number of fragments pushed so far.
    pub fn fragment_count(&self) -> usize {
        self.content.len()
    }

    /// Render the document.
    pub fn render(&self) -> String {
        let mut html = String::from("<html><head>");
        html.push_str(&format!("<title>{}</title>", html_escape(&self.title)));
        html.extend(self.head.iter().map(String::as_str));
        html.push_str("</head><body>");
        html.extend(self.body_start.iter().map(String::as_str));
        html.extend(self.content.iter().map(String::as_str));
        html.extend(self.body_end.iter().map(String::as_str));
        html.push_str("</body></html>");
        html
    }
}
