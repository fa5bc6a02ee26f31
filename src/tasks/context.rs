use std::sync::Arc;

use crate::config::Config;
use crate::logging::Log;
use crate::manifest::ManifestStore;
use crate::platform::Platform;
use crate::resources::backup::BackupVault;
use crate::resources::package::PatchPackage;
use crate::resources::walker::TreeWalker;

/// Shared context for phase execution.
///
/// Built once per command from the loaded [`Config`]; there is no other
/// process-wide state.
pub struct Context {
    /// Resolved configuration.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and phase recording.
    pub log: Arc<dyn Log>,
    /// Report what would change without writing anything.
    pub dry_run: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Context {
    /// Creates a new context for phase execution.
    #[must_use]
    pub const fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        dry_run: bool,
    ) -> Self {
        Self {
            config,
            platform,
            log,
            dry_run,
        }
    }

    /// The patch package under the tool root.
    #[must_use]
    pub fn package(&self) -> PatchPackage {
        PatchPackage::new(&self.config.package_dir)
    }

    /// The backup vault under the tool root.
    #[must_use]
    pub fn vault(&self) -> BackupVault {
        BackupVault::new(&self.config.backup_dir)
    }

    /// The generated manifest.
    #[must_use]
    pub fn manifest_store(&self) -> ManifestStore {
        ManifestStore::new(&self.config.manifest)
    }

    /// Tree walker honouring the symlink setting.
    #[must_use]
    pub fn walker(&self) -> TreeWalker {
        TreeWalker::new(self.config.follow_symlinks)
    }
}
