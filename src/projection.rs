//! # Projections
//!
//! A projection moves content from a repository clone into the install
//! directory, either as a relative symbolic link or as a forced recursive
//! copy.
//!
//! ## Process
//!
//! 1.  **Plan**: every declared `LinkSpec` is resolved. Its source
//!     (`repo_dir/repo_src`) and destination (`install_dir/proj_dest`) must
//!     both lie inside the install directory, the source must exist, and
//!     the destination may neither be the install directory itself nor
//!     contain the source. Any violation aborts before the filesystem is
//!     touched.
//!
//! 2.  **Apply**: links are created or replaced, copies overwrite what is
//!     there. Parent directories of destinations are created as needed. A
//!     failure stops the remaining projections; ones already applied stay.
//!
//! Re-applying the same specs leaves the filesystem as the first application
//! left it: a link that already points at the right target is kept.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::filesystem;
use crate::manifest::LinkSpec;
use crate::path;

/// Counts of projections applied for one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    /// Links created or replaced.
    pub links_created: usize,
    /// Links that already pointed at the right target.
    pub links_unchanged: usize,
    /// Copy specs applied.
    pub copies: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Symlink,
    Copy,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Symlink => "symlink",
            Kind::Copy => "copy",
        }
    }
}

/// One resolved and checked projection.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    kind: Kind,
    src: PathBuf,
    dest: PathBuf,
}

/// Apply the symlink and copy specs of one repository.
///
/// # Errors
///
/// - [`Error::Projection`] if a spec lacks `repo_src` or `proj_dest`, its
///   source does not exist, its destination is unusable, or the
///   filesystem operation fails.
/// - [`Error::PathEscape`] if a source or destination resolves outside
///   `install_dir`.
pub fn apply(
    repo_dir: &Path,
    install_dir: &Path,
    symlinks: &[LinkSpec],
    copies: &[LinkSpec],
) -> Result<ProjectionReport> {
    let steps = plan(repo_dir, install_dir, symlinks, copies)?;

    let mut report = ProjectionReport::default();
    for step in &steps {
        match step.kind {
            Kind::Symlink => {
                if apply_symlink(step)? {
                    report.links_created += 1;
                } else {
                    report.links_unchanged += 1;
                }
            }
            Kind::Copy => {
                apply_copy(step)?;
                report.copies += 1;
            }
        }
    }
    Ok(report)
}

fn plan(
    repo_dir: &Path,
    install_dir: &Path,
    symlinks: &[LinkSpec],
    copies: &[LinkSpec],
) -> Result<Vec<Step>> {
    let install_root = path::resolve(install_dir);
    let specs = symlinks
        .iter()
        .map(|spec| (Kind::Symlink, spec))
        .chain(copies.iter().map(|spec| (Kind::Copy, spec)));

    let mut steps = Vec::new();
    for (position, (kind, spec)) in specs.enumerate() {
        let repo_src = required(spec.repo_src.as_deref(), kind, "repo_src", position, repo_dir)?;
        let proj_dest = required(spec.proj_dest.as_deref(), kind, "proj_dest", position, repo_dir)?;

        let src = path::ensure_contained(&repo_dir.join(repo_src), install_dir)?;
        let dest = path::ensure_location_contained(&install_dir.join(proj_dest), install_dir)?;

        if fs::symlink_metadata(&src).is_err() {
            return Err(Error::Projection {
                path: src,
                message: format!("{} source '{}' does not exist", kind.name(), repo_src),
            });
        }
        if dest == install_root {
            return Err(Error::Projection {
                path: dest,
                message: format!("{} destination is the install directory itself", kind.name()),
            });
        }
        if src.starts_with(&dest) {
            return Err(Error::Projection {
                path: dest,
                message: format!("{} destination contains its source", kind.name()),
            });
        }
        if kind == Kind::Copy && dest.starts_with(&src) {
            return Err(Error::Projection {
                path: dest,
                message: "copy destination lies inside its source".to_string(),
            });
        }

        steps.push(Step { kind, src, dest });
    }
    Ok(steps)
}

fn required<'a>(
    value: Option<&'a str>,
    kind: Kind,
    field: &str,
    position: usize,
    repo_dir: &Path,
) -> Result<&'a str> {
    value.ok_or_else(|| Error::Projection {
        path: repo_dir.to_path_buf(),
        message: format!("{} entry {} has no {}", kind.name(), position, field),
    })
}

fn io_failure(dest: &Path, action: &str, e: impl std::fmt::Display) -> Error {
    Error::Projection {
        path: dest.to_path_buf(),
        message: format!("{}: {}", action, e),
    }
}

/// Returns `true` if the link was created or replaced.
fn apply_symlink(step: &Step) -> Result<bool> {
    let parent = step
        .dest
        .parent()
        .ok_or_else(|| io_failure(&step.dest, "cannot link", "no parent directory"))?;
    let target = path::relative_path(parent, &step.src);

    if filesystem::link_target(&step.dest).as_deref() == Some(target.as_path()) {
        debug!(
            "Link {} already points to {}",
            step.dest.display(),
            target.display()
        );
        return Ok(false);
    }

    fs::create_dir_all(parent)
        .map_err(|e| io_failure(parent, "cannot create directory", e))?;

    if let Ok(metadata) = fs::symlink_metadata(&step.dest) {
        if metadata.is_dir() {
            return Err(Error::Projection {
                path: step.dest.clone(),
                message: "refusing to replace a directory with a link".to_string(),
            });
        }
        fs::remove_file(&step.dest)
            .map_err(|e| io_failure(&step.dest, "cannot remove existing file", e))?;
    }

    filesystem::symlink(&target, &step.dest, &step.src)
        .map_err(|e| io_failure(&step.dest, "cannot create link", e))?;
    info!("Linked {} -> {}", step.dest.display(), target.display());
    Ok(true)
}

fn apply_copy(step: &Step) -> Result<()> {
    if let Some(parent) = step.dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| io_failure(parent, "cannot create directory", e))?;
    }
    let files = filesystem::copy_recursive(&step.src, &step.dest)
        .map_err(|e| io_failure(&step.dest, "cannot copy", e))?;
    info!(
        "Copied {} to {} ({} files)",
        step.src.display(),
        step.dest.display(),
        files
    );
    Ok(())
}
