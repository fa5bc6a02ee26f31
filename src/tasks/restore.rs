//! Restore phase: put pre-patch backups back in place.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats, process_resources};
use crate::manifest::ManifestRecord;
use crate::resources::restore_file::RestoreFile;

/// Return every backed-up file to its pre-patch content.
#[derive(Debug)]
pub struct RestoreBackups;

impl Task for RestoreBackups {
    fn name(&self) -> &str {
        "Restore backups"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let store = ctx.manifest_store();
        if !store.exists() {
            return Ok(TaskResult::Skipped("manifest not found.".to_string()));
        }
        let records = store.load_all()?;
        let stats = restore(ctx, &records)?;
        ctx.log.info(&headline(&stats, ctx.dry_run));
        Ok(stats.finish(ctx))
    }
}

fn headline(stats: &TaskStats, dry_run: bool) -> String {
    match (stats.changed, dry_run) {
        (0, _) => "complete. all files are already in their original state.".to_string(),
        (n, true) => format!("dry run complete. would restore {n} files"),
        (n, false) => format!("complete. restored {n} files"),
    }
}

/// Restore every file record that has a differing backup.
///
/// Directory records carry no content and are passed over.
///
/// # Errors
///
/// Returns an error only if a resource reports a fatal failure.
pub fn restore(ctx: &Context, records: &[ManifestRecord]) -> Result<TaskStats> {
    let vault = ctx.vault();
    let mut stats = TaskStats::new();
    let mut resources = Vec::new();
    for record in records.iter().filter(|r| !r.is_directory()) {
        match RestoreFile::new(&record.path, &vault) {
            Ok(resource) => resources.push(resource),
            Err(e) => {
                ctx.log.warn(&format!("skipping record: {e}"));
                stats.skipped += 1;
            }
        }
    }
    stats += process_resources(ctx, resources, "restore")?;
    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::build::build;
    use crate::tasks::patch::patch;
    use crate::tasks::test_helpers::make_context;

    #[test]
    fn restores_pre_patch_content_once() {
        let tool = tempfile::tempdir().unwrap();
        let live = tempfile::tempdir().unwrap();
        let conf = live.path().join("app.conf");
        std::fs::write(&conf, "C").unwrap();

        let ctx = make_context(tool.path());
        build(&ctx, std::slice::from_ref(&conf)).unwrap();
        std::fs::write(&conf, "C'").unwrap();
        let records = ctx.manifest_store().load_all().unwrap();
        patch(&ctx, records.clone()).unwrap();
        assert_eq!(std::fs::read_to_string(&conf).unwrap(), "C");

        let first = restore(&ctx, &records).unwrap();
        assert_eq!(first.changed, 1);
        assert_eq!(std::fs::read_to_string(&conf).unwrap(), "C'");

        let second = restore(&ctx, &records).unwrap();
        assert_eq!(second.changed, 0);
        assert_eq!(second.already_ok, 1);
    }

    #[test]
    fn nothing_backed_up_restores_nothing() {
        let tool = tempfile::tempdir().unwrap();
        let live = tempfile::tempdir().unwrap();
        let conf = live.path().join("app.conf");
        std::fs::write(&conf, "C").unwrap();

        let ctx = make_context(tool.path());
        build(&ctx, std::slice::from_ref(&conf)).unwrap();
        let records = ctx.manifest_store().load_all().unwrap();
        let stats = restore(&ctx, &records).unwrap();
        assert_eq!(stats.changed, 0);
        assert_eq!(
            headline(&stats, false),
            "complete. all files are already in their original state."
        );
    }

    #[test]
    fn missing_manifest_skips_task() {
        let tool = tempfile::tempdir().unwrap();
        let ctx = make_context(tool.path());
        assert!(matches!(
            RestoreBackups.run(&ctx).unwrap(),
            TaskResult::Skipped(_)
        ));
    }

    #[test]
    fn headline_counts_restored_files() {
        let stats = TaskStats {
            changed: 4,
            ..TaskStats::new()
        };
        assert_eq!(headline(&stats, false), "complete. restored 4 files");
        assert_eq!(headline(&stats, true), "dry run complete. would restore 4 files");
    }
}
