//! Mosaic CLI - Command line tool for fragment owners and composers.
//!
//! Commands:
//! - `mosaic validate` - Validate a gateway manifest
//! - `mosaic export` - Print the export document composers receive
//! - `mosaic assets` - Show the asset tags of a fragment version
//! - `mosaic compose` - Compose a storefront page against live owners

mod commands;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{AssetsArgs, ComposeArgs, ExportArgs};

/// Mosaic CLI - Validate, inspect and compose micro-frontend fragments
#[derive(Parser)]
#[command(name = "mosaic")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Gateway manifest path (default: nearest mosaic.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the gateway manifest
    Validate,

    /// Print the gateway export document
    Export(ExportArgs),

    /// Show the asset tags a fragment version injects
    Assets(AssetsArgs),

    /// Compose a storefront page
    Compose(ComposeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    // Execute command
    let result = match cli.command {
        Commands::Validate => commands::validate::run(&ctx).await,
        Commands::Export(args) => commands::export::run(args, &ctx).await,
        Commands::Assets(args) => commands::assets::run(args, &ctx).await,
        Commands::Compose(args) => commands::compose::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
