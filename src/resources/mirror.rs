//! Directory trees that mirror absolute live paths as relative subpaths.
//!
//! `/etc/app.conf` under a mirror rooted at `/opt/patch/files` lives at
//! `/opt/patch/files/etc/app.conf`. On drive-lettered filesystems the
//! volume prefix is dropped, so `C:\Users\admin\a.txt` maps to
//! `<root>\Users\admin\a.txt` and the mirror has a single root whatever
//! volume the original lived on.
use std::io;
use std::path::{Component, Path, PathBuf};

use super::helpers::fs::{copy_dir_recursive, create_dir_all_like, remove_dir_if_exists};
use crate::error::PatchError;

/// Map an absolute path to its mirror-relative form.
///
/// # Errors
///
/// Returns an error if the path contains `..` or has no normal components.
pub fn mirror_relative(path: &Path) -> Result<PathBuf, PatchError> {
    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::Normal(part) => relative.push(part),
            Component::ParentDir => {
                return Err(PatchError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "path contains '..' and cannot be mirrored",
                    ),
                });
            }
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(PatchError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "cannot mirror a root path"),
        });
    }
    Ok(relative)
}

/// A mirror tree rooted at a directory.
#[derive(Debug, Clone)]
pub struct MirrorTree {
    root: PathBuf,
}

impl MirrorTree {
    /// Create a mirror rooted at `root`. Nothing is created on disk.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the mirror.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location inside the mirror for the live path `live`.
    ///
    /// # Errors
    ///
    /// Returns an error if `live` cannot be mirrored.
    pub fn entry_for(&self, live: &Path) -> Result<PathBuf, PatchError> {
        Ok(self.root.join(mirror_relative(live)?))
    }

    /// Copy the live file or directory at `live` into the mirror.
    ///
    /// Directories are copied recursively. For a regular file the missing
    /// parent structure is recreated inside the mirror; the immediate parent
    /// takes the live parent's permission bits before the content is copied.
    ///
    /// Returns `Ok(false)` if `live` cannot be stat'd or is neither a file
    /// nor a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if creating directories or copying content fails.
    pub fn copy_in(&self, live: &Path) -> Result<bool, PatchError> {
        let Ok(metadata) = std::fs::metadata(live) else {
            return Ok(false);
        };
        let dest = self.entry_for(live)?;

        if metadata.is_dir() {
            copy_dir_recursive(live, &dest)?;
            return Ok(true);
        }
        if !metadata.is_file() {
            return Ok(false);
        }

        if let (Some(live_parent), Some(dest_parent)) = (live.parent(), dest.parent()) {
            create_dir_all_like(dest_parent, live_parent)?;
        }
        std::fs::copy(live, &dest).map_err(|e| PatchError::Io {
            path: dest.clone(),
            source: e,
        })?;
        Ok(true)
    }

    /// Delete the whole mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror exists but cannot be removed.
    pub fn clear(&self) -> Result<(), PatchError> {
        remove_dir_if_exists(&self.root)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn strips_root_for_posix_paths() {
        assert_eq!(
            mirror_relative(Path::new("/etc/app.conf")).unwrap(),
            PathBuf::from("etc/app.conf")
        );
    }

    #[cfg(windows)]
    #[test]
    fn strips_drive_prefix() {
        assert_eq!(
            mirror_relative(Path::new(r"C:\Users\admin\test.txt")).unwrap(),
            PathBuf::from(r"Users\admin\test.txt")
        );
    }

    #[test]
    fn rejects_parent_components_and_bare_root() {
        assert!(mirror_relative(Path::new("/etc/../shadow")).is_err());
        assert!(mirror_relative(Path::new("/")).is_err());
    }

    #[test]
    fn copy_in_file_recreates_structure() {
        let live = tempfile::tempdir().unwrap();
        let mirror_dir = tempfile::tempdir().unwrap();
        let file = live.path().join("etc/app.conf");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "v1").unwrap();

        let mirror = MirrorTree::new(mirror_dir.path().join("files"));
        assert!(mirror.copy_in(&file).unwrap());

        let entry = mirror.entry_for(&file).unwrap();
        assert!(entry.starts_with(mirror.root()));
        assert_eq!(std::fs::read_to_string(entry).unwrap(), "v1");
    }

    #[test]
    fn copy_in_directory_copies_subtree() {
        let live = tempfile::tempdir().unwrap();
        let mirror_dir = tempfile::tempdir().unwrap();
        let app = live.path().join("app");
        std::fs::create_dir_all(app.join("sub")).unwrap();
        std::fs::write(app.join("sub/x"), "x").unwrap();

        let mirror = MirrorTree::new(mirror_dir.path());
        assert!(mirror.copy_in(&app).unwrap());
        let entry = mirror.entry_for(&app.join("sub/x")).unwrap();
        assert_eq!(std::fs::read_to_string(entry).unwrap(), "x");
    }

    #[test]
    fn copy_in_missing_source_returns_false() {
        let live = tempfile::tempdir().unwrap();
        let mirror_dir = tempfile::tempdir().unwrap();
        let mirror = MirrorTree::new(mirror_dir.path());
        assert!(!mirror.copy_in(&live.path().join("absent")).unwrap());
    }

    #[test]
    fn clear_removes_everything() {
        let live = tempfile::tempdir().unwrap();
        let mirror_dir = tempfile::tempdir().unwrap();
        let file = live.path().join("f");
        std::fs::write(&file, "f").unwrap();
        let mirror = MirrorTree::new(mirror_dir.path().join("backup"));
        mirror.copy_in(&file).unwrap();
        mirror.clear().unwrap();
        assert!(!mirror.root().exists());
        assert!(!mirror.entry_for(&file).unwrap().exists());
    }

    #[cfg(unix)]
    #[test]
    fn read_only_live_parent_does_not_lock_the_mirror() {
        use std::os::unix::fs::PermissionsExt as _;

        let live = tempfile::tempdir().unwrap();
        let mirror_dir = tempfile::tempdir().unwrap();
        let locked = live.path().join("locked");
        let open = live.path().join("open");
        std::fs::create_dir_all(&locked).unwrap();
        std::fs::create_dir_all(&open).unwrap();
        std::fs::write(locked.join("a.conf"), "a").unwrap();
        std::fs::write(open.join("b.conf"), "b").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        let mirror = MirrorTree::new(mirror_dir.path().join("backup"));
        let staged_a = mirror.copy_in(&locked.join("a.conf"));
        let staged_b = mirror.copy_in(&open.join("b.conf"));
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(staged_a.unwrap());
        assert!(staged_b.unwrap());
        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o700;
        assert_eq!(mode(mirror.root()), 0o700);
        let entry_a = mirror.entry_for(&locked.join("a.conf")).unwrap();
        assert_eq!(mode(entry_a.parent().unwrap()), 0o700);
        assert_eq!(std::fs::read_to_string(entry_a).unwrap(), "a");
        mirror.clear().unwrap();
    }
}
