//! # Repository Synchronization
//!
//! This module provides the `RepositorySynchronizer`, which makes sure one
//! manifest entry is checked out at the declared branch under the clone
//! root, and that no credentials survive in the clone's git metadata.
//!
//! ## Design
//!
//! Git access goes through the **`GitOperations`** trait. The default
//! implementation, `DefaultGitOperations`, wraps the system `git` command;
//! tests substitute their own implementation to simulate clones without a
//! network.
//!
//! ## Branch policy
//!
//! A missing clone is created at the declared branch. An existing clone is
//! fetched and moved to the declared branch, even when it currently sits on
//! another one. Without `force`, the move is a fast-forward, so local
//! modifications or diverged history stop the run with a `Sync` error. With
//! `force`, the local branch is reset to the remote state.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::manifest::RepoEntry;
use crate::path;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clone `url` at `branch` into `target_dir`.
    fn clone_repo(&self, url: &str, branch: &str, target_dir: &Path) -> Result<()>;

    /// Fetch `branch` from `url` and move the clone at `repo_dir` to it.
    fn update(&self, url: &str, branch: &str, repo_dir: &Path, force: bool) -> Result<()>;

    /// Strip credentials from the recorded remote URL. Returns `true` if it
    /// changed.
    fn scrub_remote(&self, repo_dir: &Path) -> Result<bool>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, url: &str, branch: &str, target_dir: &Path) -> Result<()> {
        crate::git::clone(url, branch, target_dir)
    }

    fn update(&self, url: &str, branch: &str, repo_dir: &Path, force: bool) -> Result<()> {
        crate::git::fetch(url, branch, repo_dir)?;
        crate::git::checkout(repo_dir, branch, force, url)
    }

    fn scrub_remote(&self, repo_dir: &Path) -> Result<bool> {
        crate::git::scrub_remote(repo_dir)
    }
}

/// What synchronizing a repository did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Cloned,
    Updated,
}

/// A repository that is present at its declared branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedRepo {
    /// Resolved clone directory.
    pub dir: PathBuf,
    pub outcome: SyncOutcome,
}

/// Clones or updates manifest repositories.
pub struct RepositorySynchronizer {
    git_ops: Box<dyn GitOperations>,
    force: bool,
}

impl RepositorySynchronizer {
    /// Creates a synchronizer backed by the system `git` command.
    ///
    /// With `force`, updates discard local modifications.
    pub fn new(force: bool) -> Self {
        Self::with_operations(Box::new(DefaultGitOperations), force)
    }

    /// Creates a synchronizer with a custom `GitOperations` implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>, force: bool) -> Self {
        Self { git_ops, force }
    }

    /// Make sure `entry` is cloned under `clone_root` and at its branch.
    ///
    /// # Errors
    ///
    /// - [`Error::PathEscape`] if the clone directory lies outside
    ///   `install_dir`.
    /// - [`Error::Sync`] if the clone directory is the install directory
    ///   itself, is occupied by something that is not a git repository, or a
    ///   git operation fails.
    pub fn sync(&self, entry: &RepoEntry, clone_root: &Path, install_dir: &Path) -> Result<SyncedRepo> {
        let repo_dir = path::ensure_contained(&clone_root.join(&entry.dest), install_dir)?;
        if repo_dir == path::resolve(install_dir) {
            return Err(Error::Sync {
                command: "clone".to_string(),
                url: entry.display_url(),
                stderr: format!(
                    "dest '{}' resolves to the install directory itself",
                    entry.dest
                ),
            });
        }

        let outcome = if crate::git::is_repository(&repo_dir) {
            debug!(
                "Updating {} in {} to branch {}",
                entry.display_url(),
                repo_dir.display(),
                entry.branch
            );
            self.git_ops
                .update(&entry.url, &entry.branch, &repo_dir, self.force)?;
            SyncOutcome::Updated
        } else {
            if !is_empty_or_missing(&repo_dir)? {
                return Err(Error::Sync {
                    command: "clone".to_string(),
                    url: entry.display_url(),
                    stderr: format!(
                        "{} exists and is not a git repository",
                        repo_dir.display()
                    ),
                });
            }
            info!(
                "Cloning {} (branch {}) into {}",
                entry.display_url(),
                entry.branch,
                repo_dir.display()
            );
            self.git_ops
                .clone_repo(&entry.url, &entry.branch, &repo_dir)?;
            SyncOutcome::Cloned
        };

        self.git_ops.scrub_remote(&repo_dir)?;

        Ok(SyncedRepo {
            dir: repo_dir,
            outcome,
        })
    }
}

fn is_empty_or_missing(dir: &Path) -> Result<bool> {
    match fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_none()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotADirectory => Ok(false),
        Err(e) => Err(e.into()),
    }
}
