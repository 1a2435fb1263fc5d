//! Error types for fragment rendering and configuration.

/// Errors raised while resolving, validating or rendering a fragment.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("Failed to find fragment version {version} for fragment {fragment}")]
    VersionNotFound { fragment: String, version: String },

    #[error("Failed to find data handler for fragment {fragment} version {version}")]
    MissingDataHandler { fragment: String, version: String },

    #[error("Failed to find handler for fragment {fragment} version {version}")]
    MissingHandler { fragment: String, version: String },

    #[error("Asset '{asset}' not found for fragment {fragment}")]
    AssetNotFound { fragment: String, asset: String },

    #[error("Rendering fragment {fragment} failed: {source:#}")]
    RenderFailed {
        fragment: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unknown render mode: {0}")]
    UnknownRenderMode(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}

impl FragmentError {
    /// Create a version lookup failure.
    pub fn version_not_found(fragment: impl Into<String>, version: impl Into<String>) -> Self {
        Self::VersionNotFound {
            fragment: fragment.into(),
            version: version.into(),
        }
    }

    /// HTTP status this error maps to at the owner's boundary.
    pub fn status(&self) -> http::StatusCode {
        match self {
            Self::UnknownRenderMode(_) => http::StatusCode::BAD_REQUEST,
            Self::AssetNotFound { .. } => http::StatusCode::NOT_FOUND,
            _ => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_not_found_message() {
        let err = FragmentError::version_not_found("product", "9.9.9");
        assert_eq!(
            err.to_string(),
            "Failed to find fragment version 9.9.9 for fragment product"
        );
        assert_eq!(err.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_data_handler_message() {
        let err = FragmentError::MissingDataHandler {
            fragment: "product".into(),
            version: "1.0.0".into(),
        };
        assert!(err.to_string().starts_with("Failed to find data handler"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            FragmentError::UnknownRenderMode("xml".into()).status(),
            http::StatusCode::BAD_REQUEST
        );
        let missing = FragmentError::AssetNotFound {
            fragment: "product".into(),
            asset: "x".into(),
        };
        assert_eq!(missing.status(), http::StatusCode::NOT_FOUND);
    }
}
