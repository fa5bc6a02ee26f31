//! Phase outcome records and the [`Log`] trait.

/// Outcome of one phase, kept for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Phase name, e.g. `Patch files`.
    pub name: String,
    /// Final status.
    pub status: TaskStatus,
    /// Headline or failure detail.
    pub message: Option<String>,
}

/// Status of a finished phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The phase ran to completion.
    Ok,
    /// An input was missing, so the phase did nothing.
    Skipped,
    /// The phase ran in dry-run mode; nothing was written.
    DryRun,
    /// The phase aborted.
    Failed,
}

/// Logging backend used by tasks and commands.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (console only with `--verbose`).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a phase result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
