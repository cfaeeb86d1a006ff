//! Ansible `roles_path` patching
//!
//! Repositories can ship Ansible roles. Their role directories are made
//! visible by adding them to `roles_path` in the `[defaults]` section of an
//! ansible config file. Ansible reads those entries relative to the config
//! file, so each role directory is stored relative to the config file's
//! directory.
//!
//! The patch is a set union that keeps first-seen order: existing entries
//! stay where they are, new ones are appended, and an entry already present
//! is never duplicated. The file is only rewritten when something was added.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ini::Ini;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::filesystem;
use crate::path;

/// Section holding `roles_path`.
pub const DEFAULTS_SECTION: &str = "defaults";
/// Key holding the colon separated role directories.
pub const ROLES_PATH_KEY: &str = "roles_path";

/// Adds repository role directories to an ansible config file.
#[derive(Debug, Clone)]
pub struct RolesPathPatcher {
    config_file: PathBuf,
    backup: bool,
}

impl RolesPathPatcher {
    pub fn new(config_file: impl Into<PathBuf>) -> Self {
        Self {
            config_file: config_file.into(),
            backup: false,
        }
    }

    /// Keep a `~` backup of the config file before rewriting it.
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    fn patch_error(&self, message: impl std::fmt::Display) -> Error {
        Error::ConfigPatch {
            path: self.config_file.clone(),
            message: message.to_string(),
        }
    }

    fn load(&self) -> Result<Ini> {
        match fs::metadata(&self.config_file) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(
                    "{} does not exist yet, starting empty",
                    self.config_file.display()
                );
                Ok(Ini::new())
            }
            _ => Ini::load_from_file(&self.config_file)
                .map_err(|e| self.patch_error(format!("cannot read config: {}", e))),
        }
    }

    /// Current `roles_path` entries, in order.
    ///
    /// A missing file, section or key reads as an empty list.
    pub fn roles_path(&self) -> Result<Vec<String>> {
        let config = self.load()?;
        Ok(split_roles_path(
            config
                .get_from(Some(DEFAULTS_SECTION), ROLES_PATH_KEY)
                .unwrap_or_default(),
        ))
    }

    /// Add `paths`, given relative to `repo_dir`, to `roles_path`.
    ///
    /// Returns the entries that were added, as written to the config file.
    ///
    /// # Errors
    ///
    /// - [`Error::PathEscape`] if a path resolves outside `repo_dir`. Nothing
    ///   is written in that case.
    /// - [`Error::ConfigPatch`] if the config file cannot be read or written.
    pub fn add_roles_path(&self, repo_dir: &Path, paths: &[&str]) -> Result<Vec<String>> {
        let config_dir = path::resolve(self.config_file.parent().unwrap_or(Path::new(".")));

        let mut wanted = Vec::with_capacity(paths.len());
        for role_path in paths {
            let resolved = path::ensure_contained(&repo_dir.join(role_path), repo_dir)?;
            let relative = path::relative_path(&config_dir, &resolved);
            wanted.push(relative.to_string_lossy().into_owned());
        }

        let mut config = self.load()?;
        let mut entries = split_roles_path(
            config
                .get_from(Some(DEFAULTS_SECTION), ROLES_PATH_KEY)
                .unwrap_or_default(),
        );

        let added = union_into(&mut entries, wanted);
        if added.is_empty() {
            debug!(
                "roles_path in {} already up to date",
                self.config_file.display()
            );
            return Ok(added);
        }

        config
            .with_section(Some(DEFAULTS_SECTION))
            .set(ROLES_PATH_KEY, entries.join(":"));

        if let Some(parent) = self.config_file.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| self.patch_error(format!("cannot create directory: {}", e)))?;
        }
        if self.backup {
            filesystem::backup_file(&self.config_file)
                .map_err(|e| self.patch_error(format!("cannot back up config: {}", e)))?;
        }
        config
            .write_to_file(&self.config_file)
            .map_err(|e| self.patch_error(format!("cannot write config: {}", e)))?;

        info!(
            "Added {} to roles_path in {}",
            added.join(":"),
            self.config_file.display()
        );
        Ok(added)
    }
}

/// Split a `roles_path` value into its non-empty entries.
pub fn split_roles_path(value: &str) -> Vec<String> {
    value
        .split(':')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Append the entries of `new` missing from `entries`, keeping first-seen
/// order. Returns what was appended.
pub fn union_into(entries: &mut Vec<String>, new: Vec<String>) -> Vec<String> {
    let mut added = Vec::new();
    for entry in new {
        if !entries.contains(&entry) {
            entries.push(entry.clone());
            added.push(entry);
        }
    }
    added
}
