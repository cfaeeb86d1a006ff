//! # Manifest Installer
//!
//! This module coordinates a complete installer run:
//!
//! 1.  **Load**: read and validate the given manifest. Any failure here
//!     stops the run before anything is written.
//! 2.  **Merge**: merge it into the persisted default manifest of the
//!     install directory.
//! 3.  **Persist**: write the default manifest back if the merge changed it
//!     or it did not exist yet.
//! 4.  **Per repository**, in manifest order: clone or update it, apply its
//!     symlinks and copies, and add its role directories to the ansible
//!     config.
//!
//! The first repository that fails stops the run. Its error names the
//! repository and the manifest file that declared it; repositories
//! processed before it stay as they are.
//!
//! Repositories are taken from the merged manifest, so every run reconciles
//! everything the install directory has accumulated, not only the entries
//! of the manifest given this time.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::manifest::{Manifest, RepoEntry, DEFAULT_MANIFEST_NAME};
use crate::merge::{merge_documents, MergeOutcome};
use crate::path;
use crate::projection::{self, ProjectionReport};
use crate::repository::{RepositorySynchronizer, SyncOutcome};
use crate::roles::RolesPathPatcher;

/// File name of the ansible config patched by default.
pub const DEFAULT_ANSIBLE_CONFIG_NAME: &str = "ansible.cfg";

/// Everything a run needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Manifest to install.
    pub manifest_path: PathBuf,
    /// Root of the installation tree.
    pub install_dir: PathBuf,
    /// Persisted default manifest. Defaults to `<install_dir>/manifest.yml`.
    pub default_manifest_path: Option<PathBuf>,
    /// Ansible config receiving role paths. Defaults to
    /// `<install_dir>/ansible.cfg`.
    pub ansible_config: Option<PathBuf>,
    /// Discard local modifications when updating clones.
    pub force: bool,
    /// Keep `~` backups of files before rewriting them.
    pub backup: bool,
}

impl InstallOptions {
    pub fn new(manifest_path: impl Into<PathBuf>, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            install_dir: install_dir.into(),
            default_manifest_path: None,
            ansible_config: None,
            force: false,
            backup: false,
        }
    }

    pub fn default_manifest_path(&self) -> PathBuf {
        self.default_manifest_path
            .clone()
            .unwrap_or_else(|| self.install_dir.join(DEFAULT_MANIFEST_NAME))
    }

    pub fn ansible_config_path(&self) -> PathBuf {
        self.ansible_config
            .clone()
            .unwrap_or_else(|| self.install_dir.join(DEFAULT_ANSIBLE_CONFIG_NAME))
    }
}

/// What happened to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    /// Repository URL with credentials redacted.
    pub url: String,
    pub dir: PathBuf,
    pub outcome: SyncOutcome,
    pub projections: ProjectionReport,
    /// `roles_path` entries added for this repository.
    pub roles_added: Vec<String>,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Resolved installation directory.
    pub install_dir: PathBuf,
    /// The merged manifest, as persisted.
    pub manifest: Manifest,
    pub default_manifest_path: PathBuf,
    /// Whether the default manifest was written this run.
    pub manifest_written: bool,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub repos: Vec<RepoReport>,
}

/// Runs manifest installations.
pub struct Installer {
    options: InstallOptions,
    synchronizer: RepositorySynchronizer,
}

impl Installer {
    /// Creates an installer that uses the system `git` command.
    pub fn new(options: InstallOptions) -> Self {
        let synchronizer = RepositorySynchronizer::new(options.force);
        Self::with_synchronizer(options, synchronizer)
    }

    /// Creates an installer with a custom repository synchronizer.
    pub fn with_synchronizer(options: InstallOptions, synchronizer: RepositorySynchronizer) -> Self {
        Self {
            options,
            synchronizer,
        }
    }

    pub fn options(&self) -> &InstallOptions {
        &self.options
    }

    /// Execute the run.
    pub fn run(&self) -> Result<InstallReport> {
        let manifest_path = &self.options.manifest_path;
        let loaded = Manifest::from_file(manifest_path)?;

        fs::create_dir_all(&self.options.install_dir)?;
        let install_dir = path::resolve(&self.options.install_dir);
        let default_path = self.options.default_manifest_path();
        let default_exists = default_path.exists();
        let default = Manifest::load_or_default(&default_path)?;

        let MergeOutcome {
            manifest,
            changed,
            added,
            updated,
        } = merge_documents(manifest_path, &loaded, &default_path, &default);

        let manifest_written = changed || !default_exists;
        if manifest_written {
            manifest.save(&default_path, self.options.backup)?;
        } else {
            debug!("Default manifest {} unchanged", default_path.display());
        }

        let clone_root = manifest.clone_root(&install_dir);
        let patcher =
            RolesPathPatcher::new(self.options.ansible_config_path()).with_backup(self.options.backup);

        let mut repos = Vec::with_capacity(manifest.repos.len());
        for entry in &manifest.repos {
            let declared_in = if loaded.find(&entry.url).is_some() {
                manifest_path.as_path()
            } else {
                default_path.as_path()
            };
            let report = self
                .install_repo(entry, &clone_root, &install_dir, &patcher)
                .map_err(|e| Error::Repository {
                    url: entry.display_url(),
                    manifest: declared_in.to_path_buf(),
                    source: Box::new(e),
                })?;
            repos.push(report);
        }

        info!(
            "Installed {} repositories into {}",
            repos.len(),
            install_dir.display()
        );

        Ok(InstallReport {
            install_dir,
            manifest,
            default_manifest_path: default_path,
            manifest_written,
            added,
            updated,
            repos,
        })
    }

    fn install_repo(
        &self,
        entry: &RepoEntry,
        clone_root: &Path,
        install_dir: &Path,
        patcher: &RolesPathPatcher,
    ) -> Result<RepoReport> {
        let synced = self.synchronizer.sync(entry, clone_root, install_dir)?;
        let projections = projection::apply(&synced.dir, install_dir, &entry.symlink, &entry.copy)?;

        let role_paths = entry.roles_paths();
        let roles_added = if role_paths.is_empty() {
            Vec::new()
        } else {
            patcher.add_roles_path(&synced.dir, &role_paths)?
        };

        Ok(RepoReport {
            url: entry.display_url(),
            dir: synced.dir,
            outcome: synced.outcome,
            projections,
            roles_added,
        })
    }
}
