//! File-system helpers shared by the mirror trees and the diff engine.
use std::path::Path;

use crate::error::PatchError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), PatchError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PatchError::io(parent, e))?;
    }
    Ok(())
}

/// Create `dir` and any missing ancestors. Ancestors get the default mode;
/// `dir` itself takes the permission bits of `template`, with the owner
/// always keeping full access so the mirror stays writable and removable.
///
/// # Errors
///
/// Returns an error if `template` cannot be stat'd or a directory cannot be
/// created.
pub fn create_dir_all_like(dir: &Path, template: &Path) -> Result<(), PatchError> {
    if dir.is_dir() {
        return Ok(());
    }
    let template_meta = std::fs::metadata(template).map_err(|e| PatchError::io(template, e))?;
    if let Some(parent) = dir.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PatchError::io(parent, e))?;
    }

    let mut builder = std::fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::{DirBuilderExt as _, PermissionsExt as _};
        builder.mode((template_meta.permissions().mode() & 0o7777) | 0o700);
    }
    #[cfg(not(unix))]
    let _ = template_meta;
    match builder.create(dir) {
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        other => other.map_err(|e| PatchError::io(dir, e)),
    }
}

/// Copy a regular file, creating the destination's parent directories.
///
/// # Errors
///
/// Returns an error if the parent cannot be created or the copy fails.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), PatchError> {
    ensure_parent_dir(dst)?;
    std::fs::copy(src, dst).map_err(|e| PatchError::Io {
        path: dst.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Recursively copy a directory tree.
///
/// Symlinks within the source tree are *followed*: the function uses
/// [`Path::is_dir`] (which follows symlinks) so directory symlinks are
/// recursed into and their contents materialised rather than copying the
/// link itself.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), PatchError> {
    std::fs::create_dir_all(dst).map_err(|e| PatchError::io(dst, e))?;
    for entry in std::fs::read_dir(src).map_err(|e| PatchError::io(src, e))? {
        let entry = entry.map_err(|e| PatchError::io(src, e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_file(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Remove `dir` and everything under it. Does nothing if it does not exist.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be removed.
pub fn remove_dir_if_exists(dir: &Path) -> Result<(), PatchError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PatchError::io(dir, e)),
    }
}
