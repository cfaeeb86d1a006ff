//! # Manifest Install Library
//!
//! This library installs a set of git repositories into an installation
//! directory as described by a YAML manifest. It is used by the
//! `manifest-install` command-line tool but can be driven directly by other
//! programs.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use manifest_install::manifest::Manifest;
//! use manifest_install::merge::merge;
//!
//! let loaded = Manifest::parse(
//!     r#"
//! repos:
//!   - url: https://example.com/tools.git
//!     dest: tools
//!     symlink:
//!       - repo_src: bin/tool
//!         proj_dest: bin/tool
//! "#,
//!     Path::new("site.yml"),
//! )
//! .unwrap();
//! assert_eq!(loaded.repos[0].branch, "master");
//!
//! let outcome = merge(&loaded, &Manifest::default());
//! assert!(outcome.changed);
//! assert_eq!(outcome.manifest.repos.len(), 1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: The YAML document listing repositories, the
//!   branch to check out and the files each one projects into the install
//!   directory.
//! - **Merging (`merge`)**: Every manifest installed is merged, keyed by URL,
//!   into the default manifest persisted in the install directory.
//! - **Containment (`path`)**: Every path a manifest names is resolved and
//!   must stay inside its boundary directory.
//! - **Repositories (`repository`, `git`)**: Cloning and updating through the
//!   system `git` command, with credentials removed from the recorded remote.
//! - **Projections (`projection`, `filesystem`)**: Relative symlinks and
//!   recursive copies from a clone into the install directory.
//! - **Roles (`roles`)**: Role directories registered in an ansible config.
//!
//! ## Execution Flow
//!
//! [`installer::Installer::run`] loads the manifest, merges it into the
//! default manifest, persists the result if it changed, and then syncs,
//! projects and registers roles for each repository in order.

pub mod error;
pub mod filesystem;
pub mod git;
pub mod installer;
pub mod manifest;
pub mod merge;
pub mod output;
pub mod path;
pub mod projection;
pub mod repository;
pub mod roles;

#[cfg(test)]
mod merge_proptest;
#[cfg(test)]
mod path_proptest;
#[cfg(test)]
mod test_support;
