//! HTML assembly for fragment pages.
//!
//! This crate turns declared assets and rendered partials into markup:
//! - `collect_assets` - Ordered, deduplicated asset tags per location
//! - `InlineSource` - Content lookup for inline assets
//! - `PageDocument` - Location-aware page document assembly

mod assets;
mod document;
mod escape;

pub use assets::*;
pub use document::*;
pub use escape::*;
