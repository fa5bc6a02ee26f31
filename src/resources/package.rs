//! The built patch package: mirrored content of every tracked regular file.
use std::path::{Path, PathBuf};

use super::mirror::MirrorTree;
use crate::error::PatchError;

/// Mirror tree that is the source of truth during patch.
///
/// Holds regular-file payloads only; ownership and mode travel through the
/// manifest.
#[derive(Debug, Clone)]
pub struct PatchPackage {
    tree: MirrorTree,
}

impl PatchPackage {
    /// Create a package rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            tree: MirrorTree::new(root),
        }
    }

    /// Root directory of the package.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.tree.root()
    }

    /// Copy the tracked regular file `live` into the package.
    ///
    /// Returns `Ok(false)` if `live` cannot be stat'd.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails.
    pub fn stage(&self, live: &Path) -> Result<bool, PatchError> {
        self.tree.copy_in(live)
    }

    /// Package content corresponding to the live path `live`.
    ///
    /// # Errors
    ///
    /// Returns an error if `live` cannot be mirrored.
    pub fn source_for(&self, live: &Path) -> Result<PathBuf, PatchError> {
        self.tree.entry_for(live)
    }

    /// Delete the package content. Run at the start of each build.
    ///
    /// # Errors
    ///
    /// Returns an error if the package cannot be removed.
    pub fn clear(&self) -> Result<(), PatchError> {
        self.tree.clear()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stage_then_resolve_source() {
        let live = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let file = live.path().join("conf/app.conf");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "payload").unwrap();

        let package = PatchPackage::new(root.path().join("files"));
        assert!(package.stage(&file).unwrap());
        let source = package.source_for(&file).unwrap();
        assert_eq!(std::fs::read_to_string(source).unwrap(), "payload");
    }
}
