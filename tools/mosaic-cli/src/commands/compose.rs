//! Page composition command.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use mosaic_core::{FragmentRequest, RENDER_MODE_QUERY};
use mosaic_fetch::ReqwestClient;
use mosaic_storefront::{Storefront, StorefrontConfig};

use super::ComposeArgs;
use crate::context::Context;

/// Run the compose command.
pub async fn run(args: ComposeArgs, ctx: &Context) -> Result<()> {
    let config = StorefrontConfig::load(ctx.resolve_path(&args.storefront))?;
    let page = config
        .page(&args.page)
        .with_context(|| format!("Page '{}' is not in {}", args.page, args.storefront))?;

    let client = ReqwestClient::new(config.http.timeouts())?;
    let storefront = Storefront::from_config(&config, Arc::new(client))?;

    let spinner = ctx.output.spinner("Fetching gateway exports...");
    let refreshed = storefront.refresh().await;
    spinner.finish_and_clear();
    refreshed.context("Failed to fetch gateway exports")?;

    let mut req = FragmentRequest::new(page.url.clone()).with_query(RENDER_MODE_QUERY, args.mode.as_query());
    for (name, value) in &args.cookies {
        req = req.with_cookie(name, value);
    }

    let response = storefront.handle_request(&req).await;
    let body = String::from_utf8_lossy(response.body());
    if !response.status().is_success() {
        bail!("Composition failed with {}: {}", response.status(), body);
    }

    println!("{}", body);
    Ok(())
}
