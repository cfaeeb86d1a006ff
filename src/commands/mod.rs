//! # CLI Command Implementations
//!
//! Each subcommand of `manifest-install` lives in its own file with:
//! - an `Args` struct with the command-specific arguments, derived using
//!   `clap`;
//! - an `execute` function that takes the parsed `Args` and the shared
//!   output configuration and calls into the `manifest_install` library.
//!
//! Commands resolve defaults that depend on the process environment (the
//! current directory, environment variables) before handing explicit
//! values to the library.

pub mod install;
pub mod show;
pub mod validate;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// The install directory given on the command line, or the current
/// directory.
pub(crate) fn install_dir_or_cwd(install_dir: Option<PathBuf>) -> Result<PathBuf> {
    match install_dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}
