//! Fragment owner ("BFF") side of the composition engine.
//!
//! This crate provides:
//! - `DataHandler` / `ContentHandler` / `PlaceholderHandler` - Handler capabilities
//! - `Fragment` - Version-aware fragment renderer
//! - `AssetSource` / `StaticFiles` - Per-version static asset contents
//! - `Bff` - Owner HTTP surface: export, render, placeholder and static routes

mod fragment;
mod handler;
mod router;
mod source;

pub use fragment::*;
pub use handler::*;
pub use router::*;
pub use source::*;
