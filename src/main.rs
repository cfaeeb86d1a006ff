//! # Manifest Install CLI
//!
//! This is the binary entry point for the `manifest-install` command-line
//! tool. It parses arguments with `clap`, sets up logging and dispatches to
//! the selected command.
//!
//! The installation logic lives in the `manifest_install` library crate;
//! the binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
