//! Path resolution and containment checks for manifest-install
//!
//! Every path the installer touches is derived from manifest data, so each
//! one is resolved to canonical absolute form and checked against the
//! directory it must stay in before anything is written.
//!
//! Resolution follows `realpath` semantics: symlinks along the existing
//! prefix of a path are followed, and the non-existent tail is normalised
//! lexically. A path is contained in a root when the relative path from the
//! resolved root to the resolved path has no `..` segment.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Upper bound on symlinks followed while resolving one path.
const MAX_SYMLINK_HOPS: usize = 40;

/// Resolve a path to canonical absolute form.
///
/// Unlike `fs::canonicalize`, the path does not have to exist. Relative
/// inputs are made absolute against the process working directory, so the
/// installer only ever passes absolute paths in.
pub fn resolve(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut hops = 0;
    resolve_components(PathBuf::new(), &absolute, &mut hops)
}

fn resolve_components(mut resolved: PathBuf, path: &Path, hops: &mut usize) -> PathBuf {
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => resolved = PathBuf::from(prefix.as_os_str()),
            Component::RootDir => resolved.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if *hops >= MAX_SYMLINK_HOPS {
                    continue;
                }
                if let Ok(target) = fs::read_link(&resolved) {
                    *hops += 1;
                    resolved.pop();
                    let base = if target.is_absolute() {
                        PathBuf::new()
                    } else {
                        resolved.clone()
                    };
                    resolved = resolve_components(base, &target, hops);
                }
            }
        }
    }
    resolved
}

/// Resolve the location of a path without following a symlink at its last
/// component.
///
/// Used for link destinations: an existing link at `dest` is about to be
/// replaced, so where it currently points is irrelevant.
pub fn resolve_location(path: &Path) -> PathBuf {
    match (path.parent(), path.components().next_back()) {
        (Some(parent), Some(Component::Normal(name))) => resolve(parent).join(name),
        _ => resolve(path),
    }
}

/// Compute the path of `target` relative to the directory `base`.
///
/// Both paths are expected in resolved form. When they share no common
/// prefix (different drives on Windows) `target` is returned unchanged.
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base_components: Vec<Component> = base.components().collect();
    let target_components: Vec<Component> = target.components().collect();

    if base_components.first() != target_components.first() {
        return target.to_path_buf();
    }

    let common = base_components
        .iter()
        .zip(&target_components)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push(Component::ParentDir.as_os_str());
    }
    for component in &target_components[common..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        PathBuf::from(Component::CurDir.as_os_str())
    } else {
        relative
    }
}

fn escapes(relative: &Path) -> bool {
    relative.is_absolute()
        || relative
            .components()
            .any(|component| matches!(component, Component::ParentDir))
}

/// Check whether `candidate` resolves to a location inside `root`.
pub fn is_contained(candidate: &Path, root: &Path) -> bool {
    !escapes(&relative_path(&resolve(root), &resolve(candidate)))
}

/// Resolve `candidate` and make sure it stays inside `root`.
///
/// Returns the resolved candidate on success.
///
/// # Errors
///
/// - Returns [`Error::PathEscape`] naming the candidate, the root and the
///   computed relative path when the candidate lies outside the root.
pub fn ensure_contained(candidate: &Path, root: &Path) -> Result<PathBuf> {
    check(resolve(candidate), candidate, root)
}

/// Like [`ensure_contained`], but resolves the candidate with
/// [`resolve_location`].
pub fn ensure_location_contained(candidate: &Path, root: &Path) -> Result<PathBuf> {
    check(resolve_location(candidate), candidate, root)
}

fn check(resolved: PathBuf, candidate: &Path, root: &Path) -> Result<PathBuf> {
    let resolved_root = resolve(root);
    let relative = relative_path(&resolved_root, &resolved);
    if escapes(&relative) {
        return Err(Error::PathEscape {
            path: candidate.to_path_buf(),
            boundary: resolved_root,
            relative,
        });
    }
    Ok(resolved)
}

/// Check whether two paths name the same existing file.
///
/// Missing files are never the same file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
