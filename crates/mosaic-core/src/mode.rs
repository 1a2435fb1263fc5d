//! Render mode negotiation.

use serde::{Deserialize, Serialize};

use crate::error::FragmentError;

/// Reserved query parameter selecting the render mode.
pub const RENDER_MODE_QUERY: &str = "__renderMode";

/// Reserved query parameter pinning a fragment version.
pub const VERSION_QUERY: &str = "__version";

/// Wire encoding requested from a fragment owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One HTML document per request.
    #[default]
    Preview,
    /// The raw partial mapping as JSON.
    Stream,
}

impl RenderMode {
    /// Parse the value of the render mode query parameter.
    ///
    /// An absent parameter means PREVIEW; any unknown value is rejected.
    pub fn from_query(value: Option<&str>) -> Result<Self, FragmentError> {
        match value {
            None => Ok(Self::Preview),
            Some("preview") => Ok(Self::Preview),
            Some("stream") => Ok(Self::Stream),
            Some(other) => Err(FragmentError::UnknownRenderMode(other.to_string())),
        }
    }

    /// Query value for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Stream => "stream",
        }
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_defaults_to_preview() {
        assert_eq!(RenderMode::from_query(None).unwrap(), RenderMode::Preview);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(RenderMode::from_query(Some("stream")).unwrap(), RenderMode::Stream);
        assert_eq!(RenderMode::from_query(Some("preview")).unwrap(), RenderMode::Preview);
    }

    #[test]
    fn test_unknown_value_rejected() {
        let err = RenderMode::from_query(Some("STREAM")).unwrap_err();
        assert!(matches!(err, FragmentError::UnknownRenderMode(v) if v == "STREAM"));
    }
}
