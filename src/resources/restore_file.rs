//! Restore direction of the diff engine: put a pre-patch backup back.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::backup::BackupVault;
use super::fingerprint::fingerprint_file;
use super::helpers::fs::copy_file;
use super::{Applicable, Resource, ResourceChange, ResourceState, live_metadata};
use crate::error::PatchError;

/// A live path and the backup entry it may be restored from.
///
/// The copy is hash-gated: a live file whose fingerprint already equals
/// the backup's is left alone, so re-running restore changes nothing.
#[derive(Debug, Clone)]
pub struct RestoreFile {
    live: PathBuf,
    backup: PathBuf,
}

impl RestoreFile {
    /// Pair `live` with its entry in `vault`.
    ///
    /// # Errors
    ///
    /// Returns an error if `live` cannot be mapped into the vault.
    pub fn new(live: &Path, vault: &BackupVault) -> Result<Self, PatchError> {
        Ok(Self {
            live: live.to_path_buf(),
            backup: vault.entry_for(live)?,
        })
    }
}

impl Applicable for RestoreFile {
    fn description(&self) -> String {
        self.live.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        if let Err(e) = copy_file(&self.backup, &self.live) {
            return Ok(ResourceChange::Skipped {
                reason: format!("copy failed: {e}"),
            });
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for RestoreFile {
    fn current_state(&self) -> Result<ResourceState> {
        let backup_meta = match live_metadata(&self.backup) {
            // Never replaced by a patch, or backups were cleared.
            Ok(None) => return Ok(ResourceState::Correct),
            Ok(Some(meta)) => meta,
            Err(e) => {
                return Ok(ResourceState::Invalid {
                    reason: format!("cannot stat backup: {e}"),
                });
            }
        };
        if !backup_meta.is_file() {
            return Ok(ResourceState::Invalid {
                reason: "backup entry is not a regular file".to_string(),
            });
        }

        let backup_hash = match fingerprint_file(&self.backup) {
            Ok(hash) => hash,
            Err(e) => {
                return Ok(ResourceState::Invalid {
                    reason: format!("could not fingerprint backup: {e}"),
                });
            }
        };

        Ok(match live_metadata(&self.live) {
            Ok(None) => ResourceState::Missing,
            Ok(Some(meta)) if meta.is_file() => match fingerprint_file(&self.live) {
                Ok(hash) if hash == backup_hash => ResourceState::Correct,
                Ok(hash) => ResourceState::Incorrect { current: hash },
                Err(e) => ResourceState::Invalid {
                    reason: format!("could not fingerprint: {e}"),
                },
            },
            Ok(Some(_)) => ResourceState::Invalid {
                reason: "live path is not a regular file".to_string(),
            },
            Err(e) => ResourceState::Invalid {
                reason: format!("cannot stat live path: {e}"),
            },
        })
    }
}
