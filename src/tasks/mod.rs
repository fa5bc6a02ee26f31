//! The three phases (build, patch, restore) and the machinery that runs them.
pub mod build;
pub mod context;
pub mod patch;
mod processing;
pub mod restore;

pub use context::Context;
pub use processing::{TaskResult, TaskStats, process_resources};

use anyhow::Result;

use crate::logging::TaskStatus;

/// A named, executable phase.
pub trait Task {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase must abort: the manifest cannot be
    /// read or written, or recorded ownership cannot be re-applied.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&reason);
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
