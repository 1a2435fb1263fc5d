//! Static asset contents per fragment version.

use std::collections::BTreeMap;

use mosaic_core::AssetDescriptor;
use mosaic_html::InlineSource;

/// Reads the body of a static asset file of one version.
pub trait AssetSource: Send + Sync {
    /// File contents, if the version ships the file.
    fn read(&self, version: &str, file_name: &str) -> Option<String>;
}

/// In-memory asset files, typically embedded with `include_str!`.
#[derive(Debug, Clone, Default)]
pub struct StaticFiles {
    files: BTreeMap<(String, String), String>,
}

impl StaticFiles {
    /// Create an empty set of files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to a version.
    pub fn with_file(
        mut self,
        version: impl Into<String>,
        file_name: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        self.files
            .insert((version.into(), file_name.into()), contents.into());
        self
    }

    /// Number of files across all versions.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files were added.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for StaticFiles {
    fn read(&self, version: &str, file_name: &str) -> Option<String> {
        self.files
            .get(&(version.to_string(), file_name.to_string()))
            .cloned()
    }
}

/// Inline content of one version, read from its asset files.
pub(crate) struct VersionInline<'a> {
    pub(crate) source: &'a dyn AssetSource,
    pub(crate) version: &'a str,
}

impl InlineSource for VersionInline<'_> {
    fn inline_content(&self, asset: &AssetDescriptor) -> Option<String> {
        self.source.read(self.version, &asset.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::{AssetLocation, AssetType};

    #[test]
    fn test_files_are_per_version() {
        let files = StaticFiles::new()
            .with_file("1.0.0", "bundle.js", "version1.0.0")
            .with_file("1.0.1", "bundle.js", "version1.0.1");

        assert_eq!(files.len(), 2);
        assert_eq!(files.read("1.0.1", "bundle.js").as_deref(), Some("version1.0.1"));
        assert_eq!(files.read("2.0.0", "bundle.js"), None);
    }

    #[test]
    fn test_inline_reads_by_file_name() {
        let files = StaticFiles::new().with_file("1.0.0", "critical.css", "b{}");
        let inline = VersionInline {
            source: &files,
            version: "1.0.0",
        };
        let asset = AssetDescriptor::inline("critical", "critical.css", AssetLocation::Head, AssetType::Css);
        assert_eq!(inline.inline_content(&asset).as_deref(), Some("b{}"));
    }
}
