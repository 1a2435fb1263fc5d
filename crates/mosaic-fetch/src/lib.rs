//! Outbound HTTP capability used to reach fragment owners.
//!
//! This crate provides:
//! - `HttpClient` - Narrow transport interface the engine depends on
//! - `FetchRequest` / `FetchResponse` - Transport-neutral request and response
//! - `FetchError` - Upstream fetch failures
//! - `TimeoutConfig` - Per-fetch timeouts applied by clients
//! - `SpinClient` - Spin outbound HTTP (wasm32 only)
//! - `ReqwestClient` - Native client (feature `native`)

mod client;
mod error;
mod request;
mod response;
mod timeout;

#[cfg(feature = "native")]
mod native;
#[cfg(target_arch = "wasm32")]
mod spin;

pub use client::*;
pub use error::*;
pub use request::*;
pub use response::*;
pub use timeout::*;

#[cfg(feature = "native")]
pub use native::ReqwestClient;
#[cfg(target_arch = "wasm32")]
pub use spin::SpinClient;
