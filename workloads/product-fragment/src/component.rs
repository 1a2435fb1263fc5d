//! Spin HTTP entry point.

use spin_sdk::http_component;

/// Main HTTP handler.
#[http_component]
async fn handle(req: http::Request<Vec<u8>>) -> anyhow::Result<http::Response<Vec<u8>>> {
    let bff = crate::bff()?;
    Ok(bff.handle(&req).await)
}
