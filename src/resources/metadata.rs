//! Ownership and permission metadata: collection at build time and
//! re-application after a patch copy.
use std::fs::Metadata;
use std::path::Path;

use crate::error::PatchError;
use crate::manifest::Ownership;
use crate::platform::Platform;

/// Extract owner, group and permission bits from already-fetched metadata.
///
/// Returns `None` on platforms without POSIX ownership.
#[must_use]
pub fn collect(metadata: &Metadata, platform: &Platform) -> Option<Ownership> {
    if !platform.supports_ownership {
        return None;
    }
    from_metadata(metadata)
}

#[cfg(unix)]
fn from_metadata(metadata: &Metadata) -> Option<Ownership> {
    use std::os::unix::fs::MetadataExt;
    Some(Ownership {
        uid: metadata.uid(),
        gid: metadata.gid(),
        mode: metadata.mode() & 0o7777,
    })
}

#[cfg(not(unix))]
fn from_metadata(_metadata: &Metadata) -> Option<Ownership> {
    None
}

/// Apply recorded ownership and permission bits to `path`.
///
/// Ownership is changed before the mode because `chown` clears
/// setuid/setgid bits.
///
/// # Errors
///
/// Returns [`PatchError::PermissionApply`] if either change fails.
#[cfg(unix)]
pub fn apply(path: &Path, ownership: &Ownership) -> Result<(), PatchError> {
    use std::os::unix::fs::PermissionsExt;

    let fail = |source: std::io::Error| PatchError::PermissionApply {
        path: path.to_path_buf(),
        source,
    };
    std::os::unix::fs::chown(path, Some(ownership.uid), Some(ownership.gid)).map_err(fail)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(ownership.mode))
        .map_err(fail)?;
    Ok(())
}

/// Ownership cannot be applied on this platform; records never carry it here.
///
/// # Errors
///
/// Never fails.
#[cfg(not(unix))]
pub fn apply(_path: &Path, _ownership: &Ownership) -> Result<(), PatchError> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::platform::Os;

    #[test]
    fn platform_without_ownership_collects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        let platform = Platform::new(Os::Windows, false);
        let meta = std::fs::metadata(&file).unwrap();
        assert!(collect(&meta, &platform).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn collects_mode_and_ids() {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o640)).unwrap();

        let meta = std::fs::metadata(&file).unwrap();
        let own = collect(&meta, &Platform::new(Os::Linux, true)).unwrap();
        assert_eq!(own.mode, 0o640);
        assert_eq!(own.uid, meta.uid());
        assert_eq!(own.gid, meta.gid());
    }

    #[cfg(unix)]
    #[test]
    fn apply_sets_mode_for_own_file() {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        let meta = std::fs::metadata(&file).unwrap();

        let own = Ownership {
            uid: meta.uid(),
            gid: meta.gid(),
            mode: 0o600,
        };
        apply(&file, &own).unwrap();
        let mode = std::fs::metadata(&file).unwrap().permissions().mode() & 0o7777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn apply_on_missing_path_is_permission_apply_error() {
        let dir = tempfile::tempdir().unwrap();
        let own = Ownership {
            uid: 0,
            gid: 0,
            mode: 0o644,
        };
        let err = apply(&dir.path().join("gone"), &own).unwrap_err();
        assert!(err.is_fatal());
    }
}
