//! Build phase: walk the tracked roots, write the manifest and stage the
//! package.
use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats};
use crate::error::PatchError;
use crate::manifest::{Fingerprint, ManifestRecord, ManifestWriter};
use crate::resources::fingerprint::fingerprint_file;
use crate::resources::metadata;
use crate::resources::walker::{EntryKind, WalkEntry};

/// Rebuild the manifest and package from `manifest.cfg`.
#[derive(Debug)]
pub struct BuildPackage;

impl Task for BuildPackage {
    fn name(&self) -> &str {
        "Build package"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(roots) = ctx
            .config
            .tracked_paths()
            .context("reading tracked paths")?
        else {
            return Ok(TaskResult::Skipped(
                "manifest config file not found.".to_string(),
            ));
        };
        let stats = build(ctx, &roots)?;
        ctx.log.info(&headline(&stats, ctx.dry_run));
        Ok(stats.finish(ctx))
    }
}

/// Operator-facing result line.
fn headline(stats: &TaskStats, dry_run: bool) -> String {
    match (stats.changed, dry_run) {
        (0, _) => "complete. no files found.".to_string(),
        (n, true) => format!("dry run complete. would add {n} files"),
        (n, false) => format!("build complete. added {n} files"),
    }
}

/// Clear backups, package and manifest, then record and stage every entry
/// under `roots`.
///
/// `changed` counts records written. Missing roots and entries that cannot
/// be fingerprinted or staged are logged and counted as skipped.
///
/// # Errors
///
/// Returns an error if the previous state cannot be cleared or the manifest
/// cannot be created or written.
pub fn build(ctx: &Context, roots: &[PathBuf]) -> Result<TaskStats> {
    let package = ctx.package();
    let mut writer = if ctx.dry_run {
        None
    } else {
        ctx.vault().clear().context("clearing backups")?;
        package.clear().context("clearing package")?;
        Some(ctx.manifest_store().create()?)
    };

    let walker = ctx.walker();
    let mut seen = HashSet::new();
    let mut stats = TaskStats::new();

    for root in roots {
        ctx.log.debug(&format!("walking {}", root.display()));
        let walked = walker.walk(root, |entry: &WalkEntry| -> Result<()> {
            if !seen.insert(entry.path.clone()) {
                ctx.log
                    .debug(&format!("already recorded: {}", entry.path.display()));
                return Ok(());
            }
            let Some(record) = make_record(ctx, entry) else {
                stats.skipped += 1;
                return Ok(());
            };
            match writer.as_mut() {
                None => {
                    ctx.log
                        .dry_run(&format!("would add {}", entry.path.display()));
                    stats.changed += 1;
                }
                Some(writer) => {
                    if add_entry(ctx, writer, entry, &record)? {
                        stats.changed += 1;
                    } else {
                        stats.skipped += 1;
                    }
                }
            }
            Ok(())
        });

        match walked {
            Ok(report) => {
                for skipped in report.skipped {
                    ctx.log.warn(&format!(
                        "skipped {}: {}",
                        skipped.path.display(),
                        skipped.reason
                    ));
                    stats.skipped += 1;
                }
            }
            Err(e) => match e.downcast_ref::<PatchError>() {
                Some(PatchError::NotFound { path } | PatchError::Io { path, .. })
                    if path == root =>
                {
                    ctx.log.warn(&format!("skipped tracked path: {e}"));
                    stats.skipped += 1;
                }
                _ => return Err(e),
            },
        }
    }

    if let Some(writer) = writer {
        let written = writer.finish()?;
        ctx.log.debug(&format!("{written} records written"));
    }
    Ok(stats)
}

/// Describe `entry` as a manifest record, or `None` if it cannot be
/// encoded or fingerprinted.
fn make_record(ctx: &Context, entry: &WalkEntry) -> Option<ManifestRecord> {
    if entry.path.to_str().is_none() {
        ctx.log.warn(&format!(
            "skipping path that is not valid UTF-8: {}",
            entry.path.display()
        ));
        return None;
    }
    let fingerprint = match entry.kind {
        EntryKind::Directory => Fingerprint::Directory,
        EntryKind::File => match fingerprint_file(&entry.path) {
            Ok(hash) => Fingerprint::Content(hash),
            Err(e) => {
                ctx.log.warn(&format!("could not fingerprint: {e}"));
                return None;
            }
        },
    };
    Some(ManifestRecord {
        fingerprint,
        path: entry.path.clone(),
        ownership: metadata::collect(&entry.metadata, &ctx.platform),
    })
}

/// Stage a file into the package and append its record.
///
/// Returns `Ok(false)` if staging failed; the entry is left out of the
/// manifest so patch never references a missing payload. `record` must
/// already be encodable, so an append error means the manifest itself
/// could not be written.
fn add_entry(
    ctx: &Context,
    writer: &mut ManifestWriter,
    entry: &WalkEntry,
    record: &ManifestRecord,
) -> Result<bool> {
    if entry.kind == EntryKind::File {
        match ctx.package().stage(&entry.path) {
            Ok(true) => {}
            Ok(false) => {
                ctx.log
                    .warn(&format!("could not stage {}", entry.path.display()));
                return Ok(false);
            }
            Err(e) => {
                ctx.log.warn(&format!("could not stage: {e}"));
                return Ok(false);
            }
        }
    }
    Ok(writer.append(record)?)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::make_context;

    fn live_tree() -> (tempfile::TempDir, PathBuf) {
        let live = tempfile::tempdir().unwrap();
        let app = live.path().join("app");
        std::fs::create_dir_all(app.join("conf.d")).unwrap();
        std::fs::write(app.join("main.conf"), "main").unwrap();
        std::fs::write(app.join("conf.d/extra.conf"), "extra").unwrap();
        (live, app)
    }

    #[test]
    fn records_directories_and_files() {
        let tool = tempfile::tempdir().unwrap();
        let (_live, app) = live_tree();
        let ctx = make_context(tool.path());

        let stats = build(&ctx, std::slice::from_ref(&app)).unwrap();
        assert_eq!(stats.changed, 4);

        let records = ctx.manifest_store().load_all().unwrap();
        assert_eq!(records.len(), 4);
        let dirs = records.iter().filter(|r| r.is_directory()).count();
        assert_eq!(dirs, 2);

        let staged = ctx.package().source_for(&app.join("conf.d/extra.conf")).unwrap();
        assert_eq!(std::fs::read_to_string(staged).unwrap(), "extra");
    }

    #[test]
    fn overlapping_roots_are_recorded_once() {
        let tool = tempfile::tempdir().unwrap();
        let (_live, app) = live_tree();
        let ctx = make_context(tool.path());

        let roots = [app.clone(), app.join("main.conf")];
        let stats = build(&ctx, &roots).unwrap();
        assert_eq!(stats.changed, 4);
        assert_eq!(ctx.manifest_store().load_all().unwrap().len(), 4);
    }

    #[test]
    fn missing_root_is_skipped() {
        let tool = tempfile::tempdir().unwrap();
        let (live, app) = live_tree();
        let ctx = make_context(tool.path());

        let roots = [live.path().join("absent"), app];
        let stats = build(&ctx, &roots).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.changed, 4);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_is_skipped_not_fatal() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt as _;

        let tool = tempfile::tempdir().unwrap();
        let (_live, app) = live_tree();
        let bad = app.join(OsStr::from_bytes(b"bad\xff.conf"));
        if std::fs::write(&bad, "bad").is_err() {
            // Filesystem refuses non-UTF-8 names; nothing to check.
            return;
        }
        let ctx = make_context(tool.path());

        let stats = build(&ctx, std::slice::from_ref(&app)).unwrap();
        assert_eq!(stats.changed, 4);
        assert_eq!(stats.skipped, 1);
        assert_eq!(ctx.manifest_store().load_all().unwrap().len(), 4);
        assert!(!ctx.package().source_for(&bad).unwrap().exists());
    }

    #[test]
    fn rebuild_clears_previous_state() {
        let tool = tempfile::tempdir().unwrap();
        let (_live, app) = live_tree();
        let ctx = make_context(tool.path());
        let stale_backup = ctx.vault().root().join("old");
        std::fs::create_dir_all(&stale_backup).unwrap();

        build(&ctx, std::slice::from_ref(&app)).unwrap();
        std::fs::remove_file(app.join("main.conf")).unwrap();
        build(&ctx, std::slice::from_ref(&app)).unwrap();

        assert!(!stale_backup.exists());
        assert_eq!(ctx.manifest_store().load_all().unwrap().len(), 3);
        assert!(!ctx.package().source_for(&app.join("main.conf")).unwrap().exists());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tool = tempfile::tempdir().unwrap();
        let (_live, app) = live_tree();
        let mut ctx = make_context(tool.path());
        ctx.dry_run = true;

        let stats = build(&ctx, &[app]).unwrap();
        assert_eq!(stats.changed, 4);
        assert!(!ctx.manifest_store().exists());
        assert!(!ctx.package().root().exists());
    }

    #[test]
    fn missing_tracked_list_skips_task() {
        let tool = tempfile::tempdir().unwrap();
        let ctx = make_context(tool.path());
        let result = BuildPackage.run(&ctx).unwrap();
        assert!(
            matches!(result, TaskResult::Skipped(ref reason) if reason == "manifest config file not found.")
        );
    }

    #[test]
    fn headline_messages() {
        let none = TaskStats::new();
        assert_eq!(headline(&none, false), "complete. no files found.");
        let some = TaskStats {
            changed: 3,
            ..TaskStats::new()
        };
        assert_eq!(headline(&some, false), "build complete. added 3 files");
        assert_eq!(headline(&some, true), "dry run complete. would add 3 files");
    }
}
