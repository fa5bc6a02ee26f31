//! Configuration: tool-root locations and the tracked-paths list.
pub mod settings;
pub mod toml_loader;
pub mod tracked;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub use settings::Settings;

/// Resolved configuration, constructed once at startup and passed to every
/// phase through [`Context`](crate::tasks::Context).
#[derive(Debug, Clone)]
pub struct Config {
    /// Tool root directory that holds the package, backups and manifest.
    pub root: PathBuf,
    /// Mirrored package content (source of truth during patch).
    pub package_dir: PathBuf,
    /// Pre-patch backups (source of truth during restore).
    pub backup_dir: PathBuf,
    /// Generated manifest file.
    pub manifest: PathBuf,
    /// Operator-authored tracked-paths list.
    pub tracked_paths_file: PathBuf,
    /// Follow symbolic links while walking tracked trees.
    pub follow_symlinks: bool,
}

impl Config {
    /// Load configuration rooted at `root`.
    ///
    /// Reads the optional `filepatch.toml`; the tracked-paths list itself is
    /// only read by the build phase via [`tracked_paths`](Self::tracked_paths).
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but is invalid.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let settings = settings::load(root)?;
        Ok(Self::from_settings(root, &settings))
    }

    /// Resolve `settings` against `root`.
    #[must_use]
    pub fn from_settings(root: &Path, settings: &Settings) -> Self {
        Self {
            root: root.to_path_buf(),
            package_dir: root.join(&settings.package_dir),
            backup_dir: root.join(&settings.backup_dir),
            manifest: root.join(&settings.manifest),
            tracked_paths_file: root.join(&settings.tracked_paths),
            follow_symlinks: settings.follow_symlinks,
        }
    }

    /// Read the tracked root paths, or `None` if the list file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read or contains invalid paths.
    pub fn tracked_paths(&self) -> Result<Option<Vec<PathBuf>>, ConfigError> {
        tracked::load(&self.tracked_paths_file)
    }
}
