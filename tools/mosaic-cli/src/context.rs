//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use mosaic_core::GatewayManifest;

use crate::output::Output;

/// Manifest file names, in lookup order.
const MANIFEST_NAMES: [&str; 3] = ["mosaic.toml", ".mosaic.toml", "mosaic.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Gateway manifest location, if one was given or found.
    pub manifest_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Build the context, locating the manifest when no path is given.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let manifest_path = match config_path {
            Some(path) => Some(resolve_path(&cwd, path)),
            None => find_manifest(&cwd),
        };

        Ok(Self {
            manifest_path,
            output,
            cwd,
        })
    }

    /// Load and validate the gateway manifest.
    pub fn manifest(&self) -> Result<GatewayManifest> {
        let path = self
            .manifest_path
            .as_ref()
            .context("No mosaic.toml found in this directory or its parents; pass --config")?;
        self.output.debug(&format!("Using manifest {}", path.display()));
        GatewayManifest::load(path)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve_path(&self.cwd, path)
    }
}

fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

/// Find a manifest in `start` or its ancestors.
fn find_manifest(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        MANIFEST_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}
