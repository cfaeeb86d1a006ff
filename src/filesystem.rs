//! Host filesystem primitives used by the installer
//!
//! Thin wrappers over `std::fs` for the operations projections need:
//! replacing whatever currently sits at a destination, creating symbolic
//! links, recursive copies that overwrite existing content, and `~` backups
//! of files about to be rewritten.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::Result;

/// Rename an existing file to a backup name before it is rewritten.
///
/// The backup name is the resolved path with `~` appended, adding further
/// `~` until the name is free. Returns the backup path, or `None` if there
/// was nothing to back up.
pub fn backup_file(path: &Path) -> Result<Option<PathBuf>> {
    let real_path = match fs::canonicalize(path) {
        Ok(path) => path,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut backup = real_path.clone().into_os_string();
    backup.push("~");
    while Path::new(&backup).exists() {
        backup.push("~");
    }
    let backup = PathBuf::from(backup);

    info!(
        "Backup file {} to file {}",
        real_path.display(),
        backup.display()
    );
    fs::rename(&real_path, &backup)?;
    Ok(Some(backup))
}

/// Remove whatever exists at `path` without following a final symlink.
///
/// Missing paths are fine. Directories are removed recursively.
pub fn remove_existing(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Create a symbolic link at `link` pointing to `target`.
///
/// On Windows the link kind is chosen from what `target_hint` (the absolute
/// location of the target) currently is.
#[cfg(unix)]
pub fn symlink(target: &Path, link: &Path, _target_hint: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(windows)]
pub fn symlink(target: &Path, link: &Path, target_hint: &Path) -> Result<()> {
    if target_hint.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)?;
    } else {
        std::os::windows::fs::symlink_file(target, link)?;
    }
    Ok(())
}

/// Read the target of a symbolic link, or `None` if `path` is not a link.
pub fn link_target(path: &Path) -> Option<PathBuf> {
    let metadata = fs::symlink_metadata(path).ok()?;
    if metadata.file_type().is_symlink() {
        fs::read_link(path).ok()
    } else {
        None
    }
}

/// Recursively copy `src` to `dest`, overwriting what is already there.
///
/// Files are copied with their permissions. Symbolic links inside a copied
/// directory are recreated as links rather than followed. An existing `dest`
/// of a different kind (file vs. directory, or any symlink) is removed first
/// so the copy never writes through a link. Returns the number of files
/// copied.
pub fn copy_recursive(src: &Path, dest: &Path) -> Result<usize> {
    if src.is_dir() {
        if !is_real_dir(dest) {
            remove_existing(dest)?;
        }
        fs::create_dir_all(dest)?;

        let mut copied = 0;
        for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
            let entry = entry.map_err(std::io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(src)
                .map_err(|e| std::io::Error::new(ErrorKind::InvalidInput, e))?;
            let target = dest.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                if !is_real_dir(&target) {
                    remove_existing(&target)?;
                }
                fs::create_dir_all(&target)?;
            } else if file_type.is_symlink() {
                remove_existing(&target)?;
                let link = fs::read_link(entry.path())?;
                symlink(&link, &target, entry.path())?;
            } else {
                copy_file(entry.path(), &target)?;
                copied += 1;
            }
        }
        debug!(
            "Copied {} files from {} to {}",
            copied,
            src.display(),
            dest.display()
        );
        Ok(copied)
    } else {
        copy_file(src, dest)?;
        Ok(1)
    }
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    match fs::symlink_metadata(dest) {
        Ok(metadata) if metadata.is_file() => {}
        _ => remove_existing(dest)?,
    }
    fs::copy(src, dest)?;
    Ok(())
}

fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}
