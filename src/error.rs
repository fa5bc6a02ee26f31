//! Domain-specific error types for the patch engine.
//!
//! Internal modules return [`PatchError`] while command handlers at the CLI
//! boundary convert to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! PatchError
//! ├── NotFound          : path missing (usually recoverable)
//! ├── Io                : read/copy/stat failure for one entry
//! ├── PermissionApply   : chown/chmod failed during patch (fatal)
//! ├── ManifestFormat    : malformed manifest line
//! └── Config(ConfigError)
//! ```
//!
//! Only `PermissionApply` and failures on the manifest itself abort a run.
//! Everything else is caught at the entry boundary, logged and skipped.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Top-level error type for the patch engine.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The path does not exist.
    #[error("path not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Reading, copying or stat'ing a path failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Applying recorded ownership or permission bits failed.
    #[error("failed to apply ownership/permissions to {}: {source}", path.display())]
    PermissionApply {
        /// Live path whose metadata could not be applied.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A manifest line could not be parsed.
    #[error("malformed manifest record at line {line}: {reason}")]
    ManifestFormat {
        /// One-based line number in the manifest file.
        line: usize,
        /// Human-readable explanation.
        reason: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PatchError {
    /// Wrap an I/O error for `path`, mapping `ErrorKind::NotFound` to
    /// [`PatchError::NotFound`].
    #[must_use]
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Returns `true` for errors that must abort the whole run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::PermissionApply { .. })
    }
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("IO error reading config file {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A config file could not be parsed.
    #[error("Invalid config in {}: {message}", path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A tracked path is not absolute.
    #[error("tracked path on line {line} is not absolute: {path}")]
    RelativePath {
        /// One-based line number in the tracked-paths file.
        line: usize,
        /// The offending path as written.
        path: String,
    },

    /// A tracked path contains a `..` component.
    #[error("tracked path on line {line} contains '..': {path}")]
    ParentTraversal {
        /// One-based line number in the tracked-paths file.
        line: usize,
        /// The offending path as written.
        path: String,
    },
}
