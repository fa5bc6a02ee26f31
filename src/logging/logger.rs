//! Console/file logger with an end-of-run phase summary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, TaskEntry, TaskStatus};
use super::utils::log_file_path;

/// Implement the message methods of [`Log`] by delegating to inherent
/// methods of the same name.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger that emits `tracing` events and collects phase outcomes.
///
/// Every event also lands in `$XDG_CACHE_HOME/filepatch/<command>.log`
/// through the subscriber's file layer, whatever the console verbosity.
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command`.
    ///
    /// The log file itself is opened by
    /// [`init_subscriber`](super::subscriber::init_subscriber); the path is
    /// kept here only to show it in the summary.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "filepatch::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: "filepatch::dry_run", "{msg}");
    }

    /// Record a phase result for the summary.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Forget recorded phases. The interactive menu calls this between
    /// selections so each summary covers one phase.
    pub fn clear_tasks(&self) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.clear();
        }
    }

    /// Count the phases that failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .count()
        })
    }

    /// Print the recorded phase outcomes and the log file location.
    pub fn print_summary(&self) {
        let tasks = match self.tasks.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if tasks.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        for task in &tasks {
            let (icon, color) = match task.status {
                TaskStatus::Ok => ("✓", "\x1b[32m"),
                TaskStatus::Skipped => ("○", "\x1b[33m"),
                TaskStatus::DryRun => ("~", "\x1b[37m"),
                TaskStatus::Failed => ("✗", "\x1b[31m"),
            };
            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", task.name));
        }

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, status, message);
    }
}
