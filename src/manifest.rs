//! # Manifest Schema and Parsing
//!
//! This module defines the data structures behind a manifest file and the
//! logic for loading, validating and persisting them.
//!
//! ## Key Components
//!
//! - **`Manifest`**: an optional `clone_dir` and an ordered list of
//!   repositories.
//! - **`RepoEntry`**: one repository to clone, with the symlinks, copies and
//!   role paths to project out of it.
//! - **`LinkSpec`**: a `repo_src` inside the clone and a `proj_dest` inside
//!   the install directory.
//! - **`RolesPath`**: `add_roles_path` given as a single string or a list.
//!
//! ## Parsing
//!
//! Parsing happens in two steps. The document is first read as a raw
//! `serde_yaml::Value` and its shape is checked (a mapping, a list-typed
//! `repos`, a string `url` in every entry) so that errors can name the
//! offending field. The checked value is then deserialized into the typed
//! schema, which rejects unknown fields.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::filesystem;
use crate::git;

/// File name of the persisted default manifest inside an install directory.
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.yml";

/// Returns the branch used when an entry does not declare one.
pub fn default_branch() -> String {
    "master".to_string()
}

/// A symlink or copy declaration.
///
/// Both fields are optional at parse time so that a missing side is reported
/// by the projection step, which knows which repository it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSpec {
    /// Path relative to the repository clone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_src: Option<String>,
    /// Path relative to the install directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proj_dest: Option<String>,
}

impl LinkSpec {
    pub fn new(repo_src: impl Into<String>, proj_dest: impl Into<String>) -> Self {
        Self {
            repo_src: Some(repo_src.into()),
            proj_dest: Some(proj_dest.into()),
        }
    }
}

/// Role directories to add to the ansible `roles_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RolesPath {
    One(String),
    Many(Vec<String>),
}

impl RolesPath {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            RolesPath::One(path) => vec![path.as_str()],
            RolesPath::Many(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// One repository declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoEntry {
    /// Clone URL. May embed credentials.
    pub url: String,
    /// Clone directory, relative to the manifest's clone directory.
    pub dest: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symlink: Vec<LinkSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copy: Vec<LinkSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_roles_path: Option<RolesPath>,
}

impl RepoEntry {
    pub fn new(url: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            branch: default_branch(),
            symlink: Vec::new(),
            copy: Vec::new(),
            add_roles_path: None,
        }
    }

    /// The URL with any embedded credentials replaced, safe for logs.
    pub fn display_url(&self) -> String {
        git::redact_credentials(&self.url)
    }

    /// Role paths declared by this entry, in declaration order.
    pub fn roles_paths(&self) -> Vec<&str> {
        self.add_roles_path
            .as_ref()
            .map(RolesPath::paths)
            .unwrap_or_default()
    }
}

/// A manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Directory repositories are cloned into, relative to the install
    /// directory. Defaults to the install directory itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_dir: Option<String>,
    #[serde(default)]
    pub repos: Vec<RepoEntry>,
}

impl Manifest {
    /// Parse and validate a manifest document.
    ///
    /// `source` only labels errors; nothing is read from it.
    ///
    /// # Errors
    ///
    /// - Returns [`Error::Validation`] if the document is not valid YAML, is
    ///   not a mapping with a list-typed `repos` field, has an entry without
    ///   a string `url`, or otherwise does not match the schema.
    pub fn parse(content: &str, source: &Path) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)
            .map_err(|e| Error::validation(source, format!("invalid YAML: {}", e)))?;
        validate_shape(&value, source)?;
        serde_yaml::from_value(value).map_err(|e| Error::validation(source, e.to_string()))
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// - Returns [`Error::Validation`] if the file cannot be read or does not
    ///   parse (see [`Manifest::parse`]).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::validation(path, format!("cannot read manifest: {}", e)))?;
        let manifest = Self::parse(&content, path)?;
        debug!(
            "Loaded manifest {} with {} repositories",
            path.display(),
            manifest.repos.len()
        );
        Ok(manifest)
    }

    /// Read a manifest file, or return an empty manifest if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Ok(_) => Self::from_file(path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No manifest at {}, starting empty", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::validation(
                path,
                format!("cannot read manifest: {}", e),
            )),
        }
    }

    /// Write the manifest as YAML, creating parent directories as needed.
    ///
    /// With `backup` set, an existing file is first renamed out of the way
    /// (see [`filesystem::backup_file`]).
    pub fn save(&self, path: &Path, backup: bool) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if backup {
            filesystem::backup_file(path)?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        info!("Saved manifest to {}", path.display());
        Ok(())
    }

    /// Directory repositories are cloned into for the given install directory.
    pub fn clone_root(&self, install_dir: &Path) -> PathBuf {
        match &self.clone_dir {
            Some(dir) => install_dir.join(dir),
            None => install_dir.to_path_buf(),
        }
    }

    /// Find the entry for a URL.
    pub fn find(&self, url: &str) -> Option<&RepoEntry> {
        self.repos.iter().find(|entry| entry.url == url)
    }
}

/// Check the shape the rest of the installer relies on before typed
/// deserialization, so that errors can point at a field.
fn validate_shape(value: &Value, source: &Path) -> Result<()> {
    let mapping = value
        .as_mapping()
        .ok_or_else(|| Error::validation(source, "manifest must be a mapping"))?;

    let repos = mapping
        .get("repos")
        .ok_or_else(|| Error::validation_field(source, "repos", "missing repos list"))?;
    let repos = repos
        .as_sequence()
        .ok_or_else(|| Error::validation_field(source, "repos", "repos must be a list"))?;

    for (index, entry) in repos.iter().enumerate() {
        let entry = entry.as_mapping().ok_or_else(|| {
            Error::validation_field(
                source,
                format!("repos[{}]", index),
                "repository entry must be a mapping",
            )
        })?;
        match entry.get("url") {
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(Error::validation_field(
                    source,
                    format!("repos[{}].url", index),
                    "url must be a string",
                ))
            }
            None => {
                return Err(Error::validation_field(
                    source,
                    format!("repos[{}].url", index),
                    "repository entry has no url",
                ))
            }
        }
    }

    Ok(())
}
