//! Pre-patch backups of live files.
use std::path::{Path, PathBuf};

use super::mirror::MirrorTree;
use crate::error::PatchError;

/// Mirror tree holding live content as it was before being overwritten.
///
/// Populated lazily during a patch, one entry per file actually replaced,
/// and consumed by restore. Entries are keyed by their original absolute
/// path.
#[derive(Debug, Clone)]
pub struct BackupVault {
    tree: MirrorTree,
}

impl BackupVault {
    /// Create a vault rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            tree: MirrorTree::new(root),
        }
    }

    /// Root directory of the vault.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.tree.root()
    }

    /// Copy `live` into the vault before it is overwritten.
    ///
    /// Returns `Ok(false)` if `live` cannot be stat'd; the caller should not
    /// overwrite it.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails.
    pub fn backup(&self, live: &Path) -> Result<bool, PatchError> {
        self.tree.copy_in(live)
    }

    /// Where the backup of `live` is (or would be) stored.
    ///
    /// # Errors
    ///
    /// Returns an error if `live` cannot be mirrored.
    pub fn entry_for(&self, live: &Path) -> Result<PathBuf, PatchError> {
        self.tree.entry_for(live)
    }

    /// Delete every backup. Run at the start of each patch.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault cannot be removed.
    pub fn clear(&self) -> Result<(), PatchError> {
        self.tree.clear()
    }
}
