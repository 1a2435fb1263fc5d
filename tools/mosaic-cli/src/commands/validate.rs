//! Manifest validation command.

use anyhow::Result;
use serde::Serialize;

use crate::context::Context;
use crate::output::version_badge;

#[derive(Serialize)]
struct FragmentSummary<'a> {
    name: &'a str,
    url: &'a str,
    default_version: &'a str,
    versions: Vec<&'a str>,
    assets: usize,
    is_static: bool,
}

/// Run the validate command.
pub async fn run(ctx: &Context) -> Result<()> {
    let manifest = ctx.manifest()?;

    let summaries: Vec<FragmentSummary<'_>> = manifest
        .fragments
        .iter()
        .map(|f| FragmentSummary {
            name: &f.name,
            url: &f.render.url,
            default_version: &f.version,
            versions: f.versions.keys().map(String::as_str).collect(),
            assets: f.versions.values().map(|v| v.assets.len()).sum(),
            is_static: f.render.is_static,
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&summaries);
        return Ok(());
    }

    ctx.output.header(&format!("Gateway {}", manifest.gateway.name));
    ctx.output.kv("url", &manifest.gateway.url);

    for fragment in &manifest.fragments {
        ctx.output.info(&format!("{} -> {}", fragment.name, fragment.render.url));
        for id in fragment.versions.keys() {
            ctx.output.list_item(&version_badge(id, *id == fragment.version));
        }
        if fragment.render.is_static {
            ctx.output.kv("static", "yes");
        }
    }

    ctx.output.success(&format!(
        "Manifest is valid ({} fragment(s))",
        manifest.fragments.len()
    ));
    Ok(())
}
