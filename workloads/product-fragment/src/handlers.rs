//! Handlers of the product fragment versions.

use async_trait::async_trait;
use mosaic_sdk::prelude::*;

/// Loads the signed-in user shown by the fragment.
pub struct UserData;

#[async_trait(?Send)]
impl DataHandler for UserData {
    async fn data(&self, req: &FragmentRequest) -> anyhow::Result<Value> {
        tracing::debug!(request_id = %req.request_id, "loading product user");
        Ok(json!({ "username": "ACG" }))
    }
}

/// Renders the product body from the user data.
pub struct ProductContent;

#[async_trait(?Send)]
impl ContentHandler for ProductContent {
    async fn content(&self, _req: &FragmentRequest, data: Option<Value>) -> anyhow::Result<Partials> {
        let data = data.unwrap_or_default();
        let username = data["username"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("product data has no username"))?;

        Ok(Partials::from([(
            MAIN_PARTIAL.to_string(),
            format!("<div>Rendered Fragment {}</div>", html_escape(username)),
        )]))
    }
}

/// Skeleton shown while the product is unavailable.
pub fn product_placeholder() -> String {
    "<div class=\"product-skeleton\"></div>".to_string()
}
