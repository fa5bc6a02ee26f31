//! Filesystem primitives and idempotent per-record resources (check + apply).
pub mod backup;
pub mod fingerprint;
pub mod helpers;
pub mod metadata;
pub mod mirror;
pub mod package;
pub mod patch_file;
pub mod restore_file;
pub mod walker;

use anyhow::Result;

/// State of a resource relative to the state it should be reconciled to.
///
/// # Examples
///
/// ```
/// use filepatch::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let drifted = ResourceState::Incorrect { current: "9f86d08…".into() };
/// let skip = ResourceState::Invalid { reason: "live path is a directory".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// The live path does not exist.
    Missing,
    /// The live path already matches.
    Correct,
    /// The live path exists but has drifted.
    Incorrect {
        /// Fingerprint (or other description) of the current live state.
        current: String,
    },
    /// The resource cannot be reconciled and is skipped.
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use filepatch::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let skipped = ResourceChange::Skipped { reason: "backup failed".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, skipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The live path was created or replaced.
    Applied,
    /// Nothing needed to change.
    AlreadyCorrect,
    /// The change was abandoned for this entry; the run continues.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// Per-entry failures are reported as [`ResourceChange::Skipped`].
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that must abort the whole run,
    /// such as failing to re-apply recorded ownership or permissions.
    fn apply(&self) -> Result<ResourceChange>;
}

/// Resources that can determine their own state.
///
/// ```ignore
/// let state = resource.current_state()?;
/// if resource.needs_change()? {
///     resource.apply()?;
/// }
/// ```
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined at all. Unreadable
    /// or unexpected live entries are reported as [`ResourceState::Invalid`].
    fn current_state(&self) -> Result<ResourceState>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

/// Stat `path` following symlinks, mapping "does not exist" to `Ok(None)`.
pub(crate) fn live_metadata(path: &std::path::Path) -> std::io::Result<Option<std::fs::Metadata>> {
    match std::fs::metadata(path) {
        Ok(m) => Ok(Some(m)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
