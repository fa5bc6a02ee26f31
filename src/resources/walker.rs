//! Depth-first enumeration of a tracked root.
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PatchError;

/// Kind of a visited entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file (or a followed symlink to one).
    File,
    /// Directory (or a followed symlink to one).
    Directory,
}

/// One entry handed to the visitor.
#[derive(Debug)]
pub struct WalkEntry {
    /// Path as reached from the root (not canonicalized).
    pub path: PathBuf,
    /// Entry kind.
    pub kind: EntryKind,
    /// Metadata of the entry, with symlinks resolved.
    pub metadata: Metadata,
}

/// An entry whose subtree was not visited.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    /// Path of the entry.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of a walk.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Number of entries passed to the visitor.
    pub visited: usize,
    /// Entries skipped because of stat/read failures, cycles or unsupported
    /// file types.
    pub skipped: Vec<SkippedEntry>,
}

/// Recursive walker over files and directories.
///
/// Siblings are visited in the filesystem's native enumeration order; a
/// directory is always visited before its children. A followed symlink
/// that leads back to one of its ancestors is reported as skipped rather
/// than descended into.
#[derive(Debug, Clone, Copy)]
pub struct TreeWalker {
    follow_symlinks: bool,
}

impl TreeWalker {
    /// Create a walker. With `follow_symlinks` off, symbolic links are
    /// reported as skipped instead of resolved.
    #[must_use]
    pub const fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }

    /// Walk `root`, calling `visit` for every file and directory.
    ///
    /// Per-entry failures are recorded in the report and that entry's
    /// subtree is skipped. An error returned by `visit` aborts the walk.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::NotFound`] if `root` does not exist, another
    /// [`PatchError`] if it cannot be stat'd, or the visitor's error.
    pub fn walk<E, F>(&self, root: &Path, mut visit: F) -> Result<WalkReport, E>
    where
        E: From<PatchError>,
        F: FnMut(&WalkEntry) -> Result<(), E>,
    {
        // Roots are operator-named, so a symlinked root is always resolved.
        std::fs::metadata(root).map_err(|e| PatchError::io(root, e))?;

        let walker = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .follow_root_links(true);

        let mut report = WalkReport::default();
        for next in walker {
            let entry = match next {
                Ok(entry) => entry,
                Err(e) => {
                    report.skipped.push(skipped_from(root, &e));
                    continue;
                }
            };

            if !self.follow_symlinks && entry.depth() > 0 && entry.path_is_symlink() {
                report.skipped.push(SkippedEntry {
                    path: entry.into_path(),
                    reason: "symbolic link (not followed)".to_string(),
                });
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    report.skipped.push(skipped_from(root, &e));
                    continue;
                }
            };
            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else if metadata.is_file() {
                EntryKind::File
            } else {
                report.skipped.push(SkippedEntry {
                    path: entry.into_path(),
                    reason: "not a regular file or directory".to_string(),
                });
                continue;
            };

            visit(&WalkEntry {
                path: entry.into_path(),
                kind,
                metadata,
            })?;
            report.visited += 1;
        }
        Ok(report)
    }
}

/// Describe a per-entry walk failure.
fn skipped_from(root: &Path, err: &walkdir::Error) -> SkippedEntry {
    let path = err.path().unwrap_or(root).to_path_buf();
    let reason = if let Some(ancestor) = err.loop_ancestor() {
        format!("symlink cycle back to {}", ancestor.display())
    } else if let Some(io) = err.io_error() {
        format!("cannot read: {io}")
    } else {
        err.to_string()
    };
    SkippedEntry { path, reason }
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new(true)
    }
}
