//! Per-version handler capabilities.

use std::sync::Arc;

use async_trait::async_trait;
use mosaic_core::{FragmentRequest, Partials};
use serde_json::Value;

/// Produces the view model a version renders from.
#[async_trait(?Send)]
pub trait DataHandler: Send + Sync {
    /// Load data for a request.
    async fn data(&self, req: &FragmentRequest) -> anyhow::Result<Value>;
}

/// Renders a version's named partials.
///
/// `data` is `None` for static fragments, which never fetch data.
#[async_trait(?Send)]
pub trait ContentHandler: Send + Sync {
    /// Render partials for a request.
    async fn content(&self, req: &FragmentRequest, data: Option<Value>) -> anyhow::Result<Partials>;
}

/// Produces the markup a composer shows while the fragment loads.
pub trait PlaceholderHandler: Send + Sync {
    /// Placeholder HTML.
    fn placeholder(&self) -> String;
}

impl<F> PlaceholderHandler for F
where
    F: Fn() -> String + Send + Sync,
{
    fn placeholder(&self) -> String {
        self()
    }
}

/// The capabilities of one fragment version.
///
/// Content is mandatory. Data is required unless the fragment is static.
#[derive(Clone)]
pub struct Handler {
    pub(crate) content: Arc<dyn ContentHandler>,
    pub(crate) data: Option<Arc<dyn DataHandler>>,
    pub(crate) placeholder: Option<Arc<dyn PlaceholderHandler>>,
}

impl Handler {
    /// Create a handler with only a content capability.
    pub fn new(content: impl ContentHandler + 'static) -> Self {
        Self {
            content: Arc::new(content),
            data: None,
            placeholder: None,
        }
    }

    /// Attach a data capability.
    pub fn with_data(mut self, data: impl DataHandler + 'static) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    /// Attach a placeholder capability.
    pub fn with_placeholder(mut self, placeholder: impl PlaceholderHandler + 'static) -> Self {
        self.placeholder = Some(Arc::new(placeholder));
        self
    }

    /// Whether a data capability is present.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Whether a placeholder capability is present.
    pub fn has_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("data", &self.has_data())
            .field("placeholder", &self.has_placeholder())
            .finish_non_exhaustive()
    }
}
