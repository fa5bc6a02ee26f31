//! TOML configuration file loading.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Deserialize a TOML file, treating a missing file as an empty document.
///
/// An empty document deserializes to the type's defaults, so every field of
/// `T` should carry `#[serde(default)]`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return toml::from_str("").map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}
