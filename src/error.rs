//! # Error Handling
//!
//! This module defines the centralized error type for `manifest-install`.
//! It uses the `thiserror` library to build one `Error` enum covering every
//! failure the reconciler can surface, each variant carrying the path, URL
//! or field needed to diagnose it.
//!
//! ## Taxonomy
//!
//! - **`Validation`**: the manifest (or one of its entries) has the wrong shape.
//! - **`PathEscape`**: a resolved path lies outside its designated root.
//! - **`Projection`**: a symlink or copy could not be applied.
//! - **`ConfigPatch`**: the ansible config file could not be read or written.
//! - **`Sync`**: a git operation failed.
//! - **`Repository`**: wraps any of the above with the repository and the
//!   manifest file it was declared in.
//!
//! All of them are fatal for the repository being processed. A validation
//! failure while loading a manifest is fatal for the whole run.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for manifest-install operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest document or one of its entries has the wrong shape.
    #[error("Manifest validation error in {}: {message}{}", source_file.display(), field.as_ref().map(|f| format!(" (field: {})", f)).unwrap_or_default())]
    Validation {
        /// Manifest file the document was read from
        source_file: PathBuf,
        message: String,
        /// Offending field, when one can be named
        field: Option<String>,
    },

    /// A path resolved outside the directory it must stay in.
    #[error("Path {} escapes {} (relative path: {})", path.display(), boundary.display(), relative.display())]
    PathEscape {
        path: PathBuf,
        boundary: PathBuf,
        relative: PathBuf,
    },

    /// A symlink or copy projection could not be applied.
    #[error("Projection error for {}: {message}", path.display())]
    Projection { path: PathBuf, message: String },

    /// The ansible config file could not be read or written.
    #[error("Config patch error for {}: {message}", path.display())]
    ConfigPatch { path: PathBuf, message: String },

    /// A git operation failed.
    #[error("Git {command} failed for {url}: {stderr}")]
    Sync {
        command: String,
        /// Repository URL with credentials redacted
        url: String,
        stderr: String,
    },

    /// A failure while processing one repository of a manifest.
    #[error("Repository {url} from {} failed: {source}", manifest.display())]
    Repository {
        /// Repository URL with credentials redacted
        url: String,
        manifest: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Build a validation error without a field name.
    pub fn validation(source_file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Validation {
            source_file: source_file.into(),
            message: message.into(),
            field: None,
        }
    }

    /// Build a validation error pointing at a specific field.
    pub fn validation_field(
        source_file: impl Into<PathBuf>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Validation {
            source_file: source_file.into(),
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Returns the innermost error, looking through `Repository` wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Repository { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
