//! Core abstractions for the fragment composition engine.
//!
//! This crate provides the types shared by fragment owners and composers:
//! - `AssetDescriptor` - Static assets a fragment version declares
//! - `FragmentManifest` - Owner-side fragment configuration
//! - `ExposeFragment` / `GatewayExport` - Wire contract read by composers
//! - `FragmentRequest` - Cookies, query and headers of an inbound request
//! - `VersionSelector` - Cookie and override based version resolution
//! - `RenderMode` - PREVIEW vs STREAM negotiation

mod asset;
mod context;
mod error;
mod expose;
mod manifest;
mod mode;
mod select;

pub use asset::*;
pub use context::*;
pub use error::*;
pub use expose::*;
pub use manifest::*;
pub use mode::*;
pub use select::*;

/// Named pieces of rendered output (e.g. `main`) keyed by partial name.
pub type Partials = std::collections::BTreeMap<String, String>;

/// Partial every content handler is expected to produce.
pub const MAIN_PARTIAL: &str = "main";
