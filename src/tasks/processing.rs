use anyhow::Result;

use super::context::Context;
use crate::error::PatchError;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use filepatch::tasks::TaskResult;
///
/// let skipped = TaskResult::Skipped("manifest not found.".into());
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task did nothing because an input was missing.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters returned by every phase.
///
/// # Examples
///
/// ```
/// use filepatch::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 3, already_ok: 10, skipped: 0 };
/// assert_eq!(stats.summary(false), "3 changed, 10 already ok");
/// assert_eq!(stats.summary(true), "3 would change, 10 already ok");
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 3 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Entries written, replaced or restored.
    pub changed: u32,
    /// Entries already in the desired state.
    pub already_ok: u32,
    /// Entries skipped because of per-entry failures or mismatches.
    pub skipped: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Check each resource and apply the ones that are missing or drifted,
/// one at a time in order.
///
/// `Invalid` states and `Skipped` changes are logged and counted; the loop
/// continues. In dry-run mode nothing is applied.
///
/// # Errors
///
/// Returns the first error from `current_state`, or the first `apply` error
/// that is not a non-fatal [`PatchError`] (see [`PatchError::is_fatal`]).
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += process_single(ctx, &resource, current, verb)?;
    }
    Ok(stats)
}

/// Process a single resource given its current state, returning a stats delta.
fn process_single<R: Resource>(
    ctx: &Context,
    resource: &R,
    state: ResourceState,
    verb: &str,
) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    match state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("skipping {desc}: {reason}"));
            delta.skipped += 1;
        }
        state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if ctx.dry_run {
                let msg = if let ResourceState::Incorrect { ref current } = state {
                    format!("would {verb} {desc} (currently {current})")
                } else {
                    format!("would {verb} {desc} (missing)")
                };
                ctx.log.dry_run(&msg);
                delta.changed += 1;
                return Ok(delta);
            }
            let change = match resource.apply() {
                Ok(change) => change,
                Err(e) => match e.downcast_ref::<PatchError>() {
                    Some(err) if !err.is_fatal() => ResourceChange::Skipped {
                        reason: err.to_string(),
                    },
                    _ => return Err(e),
                },
            };
            match change {
                ResourceChange::Applied => {
                    ctx.log.debug(&format!("{verb}: {desc}"));
                    delta.changed += 1;
                }
                ResourceChange::AlreadyCorrect => delta.already_ok += 1,
                ResourceChange::Skipped { reason } => {
                    ctx.log.warn(&format!("failed to {verb} {desc}: {reason}"));
                    delta.skipped += 1;
                }
            }
        }
    }
    Ok(delta)
}
