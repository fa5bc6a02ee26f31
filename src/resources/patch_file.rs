//! Patch direction of the diff engine: reconcile one live path toward the
//! package.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::backup::BackupVault;
use super::fingerprint::fingerprint_file;
use super::helpers::fs::copy_file;
use super::package::PatchPackage;
use super::{Applicable, Resource, ResourceChange, ResourceState, live_metadata, metadata};
use crate::error::PatchError;
use crate::manifest::ManifestRecord;
use crate::platform::Platform;

/// One manifest record reconciled toward the package during patch.
///
/// | live path                      | state       | apply                        |
/// |--------------------------------|-------------|------------------------------|
/// | missing                        | `Missing`   | copy from package            |
/// | file, fingerprint differs      | `Incorrect` | back up, then copy           |
/// | file, fingerprint matches      | `Correct`   | nothing                      |
/// | directory for a directory record | `Correct` | nothing                      |
/// | kind differs from the record   | `Invalid`   | skipped, never overwritten   |
///
/// Replacements re-apply the recorded ownership and mode afterwards.
#[derive(Debug, Clone)]
pub struct PatchFile {
    record: ManifestRecord,
    source: PathBuf,
    vault: BackupVault,
    apply_ownership: bool,
}

impl PatchFile {
    /// Resolve `record` against the package and backup vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the record path cannot be mapped into the package.
    pub fn new(
        record: ManifestRecord,
        package: &PatchPackage,
        vault: &BackupVault,
        platform: &Platform,
    ) -> Result<Self, PatchError> {
        let source = package.source_for(&record.path)?;
        Ok(Self {
            record,
            source,
            vault: vault.clone(),
            apply_ownership: platform.supports_ownership,
        })
    }

    fn live(&self) -> &Path {
        self.record.path()
    }

    /// Create a missing live directory. Its children are reconciled by their
    /// own records.
    fn create_directory(&self) -> Result<ResourceChange> {
        if let Err(e) = std::fs::create_dir_all(self.live()) {
            return Ok(ResourceChange::Skipped {
                reason: format!("cannot create directory: {e}"),
            });
        }
        self.apply_recorded_ownership()?;
        Ok(ResourceChange::Applied)
    }

    fn replace_file(&self) -> Result<ResourceChange> {
        let live = self.live();
        match live_metadata(live) {
            Ok(Some(meta)) if meta.is_file() => match self.vault.backup(live) {
                Ok(true) => {}
                Ok(false) => {
                    return Ok(ResourceChange::Skipped {
                        reason: "live file could not be backed up".to_string(),
                    });
                }
                Err(e) => {
                    return Ok(ResourceChange::Skipped {
                        reason: format!("backup failed: {e}"),
                    });
                }
            },
            Ok(Some(_)) => {
                return Ok(ResourceChange::Skipped {
                    reason: "live path is not a regular file".to_string(),
                });
            }
            // Nothing on the live system to preserve.
            Ok(None) => {}
            Err(e) => {
                return Ok(ResourceChange::Skipped {
                    reason: format!("cannot stat live path: {e}"),
                });
            }
        }

        if let Err(e) = copy_file(&self.source, live) {
            return Ok(ResourceChange::Skipped {
                reason: format!("copy failed: {e}"),
            });
        }
        self.apply_recorded_ownership()?;
        Ok(ResourceChange::Applied)
    }

    fn apply_recorded_ownership(&self) -> Result<(), PatchError> {
        match self.record.ownership {
            Some(ref ownership) if self.apply_ownership => metadata::apply(self.live(), ownership),
            _ => Ok(()),
        }
    }

    fn directory_state(&self) -> ResourceState {
        match live_metadata(self.live()) {
            Ok(None) => ResourceState::Missing,
            Ok(Some(meta)) if meta.is_dir() => ResourceState::Correct,
            Ok(Some(_)) => ResourceState::Invalid {
                reason: "recorded as a directory but the live path is not one".to_string(),
            },
            Err(e) => ResourceState::Invalid {
                reason: format!("cannot stat live path: {e}"),
            },
        }
    }

    fn file_state(&self) -> ResourceState {
        if !self.source.is_file() {
            return ResourceState::Invalid {
                reason: format!("package entry missing: {}", self.source.display()),
            };
        }
        match live_metadata(self.live()) {
            Ok(None) => ResourceState::Missing,
            Ok(Some(meta)) if meta.is_file() => match fingerprint_file(self.live()) {
                Ok(hash) if hash == self.record.fingerprint.as_str() => ResourceState::Correct,
                Ok(hash) => ResourceState::Incorrect { current: hash },
                Err(e) => ResourceState::Invalid {
                    reason: format!("could not fingerprint: {e}"),
                },
            },
            Ok(Some(_)) => ResourceState::Invalid {
                reason: "recorded as a file but the live path is not a regular file".to_string(),
            },
            Err(e) => ResourceState::Invalid {
                reason: format!("cannot stat live path: {e}"),
            },
        }
    }
}

impl Applicable for PatchFile {
    fn description(&self) -> String {
        self.live().display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.record.is_directory() {
            self.create_directory()
        } else {
            self.replace_file()
        }
    }
}

impl Resource for PatchFile {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(if self.record.is_directory() {
            self.directory_state()
        } else {
            self.file_state()
        })
    }
}
