//! Optional `filepatch.toml` overrides for on-disk locations.
use serde::Deserialize;
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;

/// File name of the settings file inside the tool root.
pub const SETTINGS_FILE: &str = "filepatch.toml";

/// Locations and walk behaviour, relative to the tool root.
///
/// Every field has a default, so the settings file is optional and may
/// override any subset of keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding the mirrored package content.
    pub package_dir: String,
    /// Directory holding pre-patch backups.
    pub backup_dir: String,
    /// Generated manifest file.
    pub manifest: String,
    /// Operator-authored list of tracked paths.
    pub tracked_paths: String,
    /// Follow symbolic links while walking tracked trees.
    pub follow_symlinks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            package_dir: "files".to_string(),
            backup_dir: "backup".to_string(),
            manifest: "manifest".to_string(),
            tracked_paths: "manifest.cfg".to_string(),
            follow_symlinks: true,
        }
    }
}

/// Load settings from `<root>/filepatch.toml`, falling back to defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(root: &Path) -> Result<Settings, ConfigError> {
    toml_loader::load_config(&root.join(SETTINGS_FILE))
}
