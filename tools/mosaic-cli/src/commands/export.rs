//! Export document command.

use anyhow::{Context as _, Result};
use mosaic_core::GatewayExport;

use super::ExportArgs;
use crate::context::Context;

/// Run the export command.
pub async fn run(args: ExportArgs, ctx: &Context) -> Result<()> {
    let manifest = ctx.manifest()?;
    let export = GatewayExport::from_manifest(&manifest)?;

    match args.output {
        Some(path) => {
            let path = ctx.resolve_path(&path);
            let json = serde_json::to_string_pretty(&export)?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            ctx.output.success(&format!("Wrote export to {}", path.display()));
            ctx.output.kv("hash", &export.hash);
        }
        None => ctx.output.json(&export),
    }

    Ok(())
}
