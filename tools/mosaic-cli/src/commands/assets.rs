//! Asset inspection command.

use anyhow::{Context as _, Result};
use mosaic_core::{InjectType, VersionSelector};
use mosaic_html::{collect_assets, NoInlineContent};

use super::AssetsArgs;
use crate::context::Context;

/// Run the assets command.
pub async fn run(args: AssetsArgs, ctx: &Context) -> Result<()> {
    let manifest = ctx.manifest()?;
    let fragment = manifest
        .fragment(&args.fragment)
        .with_context(|| format!("Fragment '{}' is not in the manifest", args.fragment))?;

    let resolved = VersionSelector::for_manifest(fragment).resolve(
        &fragment.versions,
        &Default::default(),
        args.version.as_deref(),
    )?;

    let tags = collect_assets(
        &fragment.name,
        resolved.id,
        &resolved.version.assets,
        &NoInlineContent,
    );

    if ctx.output.is_json() {
        ctx.output.json(&tags);
        return Ok(());
    }

    ctx.output.header(&format!("{} {}", fragment.name, resolved.id));

    let widths = [16, 10, 8, 40];
    ctx.output.table_row(&["LOCATION", "INJECT", "TYPE", "FILE"], &widths);
    for asset in &resolved.version.assets {
        let inject = match asset.inject_type {
            InjectType::External => "external",
            InjectType::Inline => "inline",
        };
        let kind = format!("{:?}", asset.kind).to_lowercase();
        ctx.output.table_row(
            &[asset.location.as_str(), inject, &kind, &asset.file_name],
            &widths,
        );
    }

    ctx.output.header("Tags");
    for (location, location_tags) in tags.iter() {
        for tag in location_tags {
            ctx.output.kv(location.as_str(), tag);
        }
    }
    let inline = resolved
        .version
        .assets
        .iter()
        .filter(|a| a.inject_type == InjectType::Inline)
        .count();
    if inline > 0 {
        ctx.output.warn(&format!(
            "{} inline asset(s) are filled in by the composer and not shown",
            inline
        ));
    }

    Ok(())
}
