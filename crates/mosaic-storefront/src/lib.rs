//! Composer ("Storefront") side of the composition engine.
//!
//! This crate provides:
//! - `FragmentStorefront` - Proxy to one remote fragment, with fallback
//! - `Page` / `ComposedPage` - Concurrent page composition
//! - `GatewayClient` - Export polling and proxy configuration
//! - `StorefrontConfig` - Gateways and pages loaded from disk
//! - `Storefront` - Composer HTTP surface

mod compose;
mod config;
mod error;
mod gateway;
mod proxy;
mod router;

#[cfg(test)]
mod testing;

pub use compose::*;
pub use config::*;
pub use error::*;
pub use gateway::*;
pub use proxy::*;
pub use router::*;
