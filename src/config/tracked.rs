//! Parsing of the operator-authored tracked-paths list (`manifest.cfg`).
use std::path::{Component, Path, PathBuf};

use crate::error::ConfigError;

/// Load tracked root paths from `path`.
///
/// Returns `Ok(None)` when the file does not exist so the caller can report
/// it as a skipped build rather than an error.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains an invalid path.
pub fn load(path: &Path) -> Result<Option<Vec<PathBuf>>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content).map(Some)
}

/// Parse tracked paths from a string.
///
/// One path per line. Surrounding whitespace is trimmed, and blank lines and
/// `#` comments are skipped. Every path must be absolute and free of `..`.
///
/// # Errors
///
/// Returns an error naming the first offending line.
pub fn parse(content: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let mut paths = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let path = PathBuf::from(line);
        if !path.is_absolute() {
            return Err(ConfigError::RelativePath {
                line: idx + 1,
                path: line.to_string(),
            });
        }
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(ConfigError::ParentTraversal {
                line: idx + 1,
                path: line.to_string(),
            });
        }
        paths.push(path);
    }
    Ok(paths)
}
