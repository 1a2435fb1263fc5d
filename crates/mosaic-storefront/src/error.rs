//! Error type for composer operations.

use mosaic_core::FragmentError;
use mosaic_fetch::FetchError;

/// Failures on the composer's asset and gateway paths.
///
/// Content and placeholder retrieval never produce these; they degrade to
/// fallbacks instead.
#[derive(Debug, thiserror::Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Fragment(#[from] FragmentError),

    #[error("Unknown fragment: {0}")]
    UnknownFragment(String),

    #[error("Unknown gateway '{gateway}' referenced by page {page}")]
    UnknownGateway { page: String, gateway: String },

    #[error("Failed to encode page: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorefrontError {
    /// HTTP status this error maps to at the composer's boundary.
    pub fn status(&self) -> http::StatusCode {
        match self {
            Self::Fetch(FetchError::Http { status: 404, .. }) => http::StatusCode::NOT_FOUND,
            Self::Fetch(_) => http::StatusCode::BAD_GATEWAY,
            Self::Fragment(err) => err.status(),
            Self::UnknownFragment(_) => http::StatusCode::NOT_FOUND,
            Self::UnknownGateway { .. } | Self::Encode(_) => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
