//! Show command implementation
//!
//! Prints the default manifest persisted in an install directory, which
//! holds every repository installed there so far.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use manifest_install::manifest::{Manifest, DEFAULT_MANIFEST_NAME};
use manifest_install::output::OutputConfig;

use super::install_dir_or_cwd;

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Installation directory (defaults to current directory)
    #[arg(long, value_name = "DIR", env = "MANIFEST_INSTALL_DIR")]
    pub manifest_install_dir: Option<PathBuf>,

    /// Default manifest to show (defaults to <DIR>/manifest.yml)
    #[arg(long, value_name = "FILE")]
    pub default_manifest: Option<PathBuf>,

    /// Print JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

/// Render a manifest as YAML or pretty JSON.
pub fn render(manifest: &Manifest, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(manifest).context("Failed to render manifest as JSON")
    } else {
        serde_yaml::to_string(manifest).context("Failed to render manifest as YAML")
    }
}

/// Execute the show command
pub fn execute(args: ShowArgs, out: &OutputConfig) -> Result<()> {
    let path = match args.default_manifest {
        Some(path) => path,
        None => install_dir_or_cwd(args.manifest_install_dir)?.join(DEFAULT_MANIFEST_NAME),
    };

    if !path.exists() {
        out.status(
            "ℹ️",
            "[INFO]",
            &format!("No manifest installed at {}", path.display()),
        );
    }
    let manifest = Manifest::load_or_default(&path)?;

    // The document itself goes to stdout even when quiet.
    let rendered = render(&manifest, args.json)?;
    println!("{}", rendered.trim_end());
    Ok(())
}
