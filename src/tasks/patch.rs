//! Patch phase: reconcile live files toward the package.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats, process_resources};
use crate::manifest::ManifestRecord;
use crate::resources::patch_file::PatchFile;

/// Bring every manifest entry on the live system back to its built state.
#[derive(Debug)]
pub struct ApplyPatch;

impl Task for ApplyPatch {
    fn name(&self) -> &str {
        "Patch files"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let store = ctx.manifest_store();
        if !store.exists() {
            return Ok(TaskResult::Skipped("manifest not found.".to_string()));
        }
        let records = store.load_all()?;
        let stats = patch(ctx, records)?;
        ctx.log.info(&headline(&stats, ctx.dry_run));
        Ok(stats.finish(ctx))
    }
}

fn headline(stats: &TaskStats, dry_run: bool) -> String {
    match (stats.changed, dry_run) {
        (0, _) => "complete. all files are intact and no action was taken.".to_string(),
        (n, true) => format!("dry run complete. would patch {n} files"),
        (n, false) => format!("complete. patched {n} files"),
    }
}

/// Clear the backup area, then reconcile each record independently.
///
/// # Errors
///
/// Returns an error if the backup area cannot be cleared or recorded
/// ownership cannot be re-applied to a replaced path.
pub fn patch(ctx: &Context, records: Vec<ManifestRecord>) -> Result<TaskStats> {
    let package = ctx.package();
    let vault = ctx.vault();
    if !ctx.dry_run {
        vault.clear().context("clearing backups")?;
    }

    let mut stats = TaskStats::new();
    let mut resources = Vec::with_capacity(records.len());
    for record in records {
        match PatchFile::new(record, &package, &vault, &ctx.platform) {
            Ok(resource) => resources.push(resource),
            Err(e) => {
                ctx.log.warn(&format!("skipping record: {e}"));
                stats.skipped += 1;
            }
        }
    }
    stats += process_resources(ctx, resources, "patch")?;
    Ok(stats)
}
