//! Public SDK for the Mosaic fragment composition engine.
//!
//! This crate re-exports the owner and composer sides:
//!
//! ```ignore
//! use mosaic_sdk::prelude::*;
//!
//! struct Product;
//!
//! #[async_trait(?Send)]
//! impl ContentHandler for Product {
//!     async fn content(&self, _req: &FragmentRequest, data: Option<Value>) -> anyhow::Result<Partials> {
//!         let user = data.unwrap_or_default();
//!         Ok(Partials::from([(MAIN_PARTIAL.to_string(), format!("<div>{}</div>", user["username"]))]))
//!     }
//! }
//!
//! let fragment = Fragment::builder(manifest)
//!     .version("1.0.0", Handler::new(Product).with_data(UserData))
//!     .build()?;
//! let bff = Bff::new(identity, vec![fragment])?;
//! ```

pub use mosaic_bff;
pub use mosaic_core;
pub use mosaic_fetch;
pub use mosaic_html;
pub use mosaic_storefront;

pub use anyhow;
pub use async_trait::async_trait;
pub use serde_json;

/// Prelude for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use mosaic_bff::*;
    pub use mosaic_core::*;
    pub use mosaic_fetch::*;
    pub use mosaic_html::*;
    pub use mosaic_storefront::*;
    pub use serde_json::{json, Value};
}
