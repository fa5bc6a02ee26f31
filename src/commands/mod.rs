//! Operator-facing commands: one per phase, plus the interactive menu.
pub mod build;
pub mod menu;
pub mod patch;
pub mod restore;
pub mod version;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::config::settings::SETTINGS_FILE;
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::tasks::{self, Context, Task};

/// Environment variable naming the tool root.
pub const ROOT_ENV: &str = "FILEPATCH_ROOT";

/// Platform and configuration shared by every command.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Platform,
    /// Configuration loaded from the tool root.
    pub config: Config,
}

impl CommandSetup {
    /// Detect the platform, resolve the tool root and load configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be determined or the settings
    /// file is invalid.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let platform = Platform::detect();
        let root = resolve_root(global)?;

        log.stage("Loading configuration");
        let config = Config::load(&root)?;
        log.info(&format!("root: {}", config.root.display()));
        log.debug(&format!("platform: {}", platform.os));
        log.debug(&format!("package: {}", config.package_dir.display()));
        log.debug(&format!("backups: {}", config.backup_dir.display()));
        log.debug(&format!("manifest: {}", config.manifest.display()));
        if !platform.supports_ownership {
            log.debug("ownership metadata not supported on this platform");
        }

        Ok(Self { platform, config })
    }

    /// Build the phase context.
    #[must_use]
    pub fn into_context(self, global: &GlobalOpts, log: &Arc<Logger>) -> Context {
        Context::new(
            Arc::new(self.config),
            Arc::new(self.platform),
            Arc::clone(log) as Arc<dyn Log>,
            global.dry_run,
        )
    }
}

/// Run one phase, print the summary, and bail if it failed.
///
/// # Errors
///
/// Returns an error if setup fails or the phase recorded a failure.
pub fn run_phase(task: &dyn Task, global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let ctx = CommandSetup::init(global, log)?.into_context(global, log);
    if ctx.dry_run {
        log.info("dry run: nothing will be written");
    }

    tasks::execute(task, &ctx);
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} phase(s) failed");
    }
    Ok(())
}

/// Determine the tool root.
///
/// Order: `--root`, then `$FILEPATCH_ROOT`, then the executable's directory
/// when it holds tool files, then the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return Ok(root.clone());
    }

    if let Ok(root) = std::env::var(ROOT_ENV) {
        return Ok(PathBuf::from(root));
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
        && looks_like_root(parent)
    {
        return Ok(dunce::canonicalize(parent)?);
    }

    std::env::current_dir().context("cannot determine tool root. Use --root or set FILEPATCH_ROOT")
}

/// Whether `dir` holds a tracked-paths list, a manifest or a settings file.
fn looks_like_root(dir: &Path) -> bool {
    ["manifest.cfg", "manifest", SETTINGS_FILE]
        .iter()
        .any(|name| dir.join(name).is_file())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resolve_root_uses_explicit_root() {
        let global = GlobalOpts {
            root: Some(PathBuf::from("/explicit/path")),
            dry_run: false,
        };
        assert_eq!(resolve_root(&global).unwrap(), PathBuf::from("/explicit/path"));
    }

    #[test]
    fn looks_like_root_needs_tool_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!looks_like_root(dir.path()));
        std::fs::write(dir.path().join("manifest.cfg"), "/etc/app.conf\n").unwrap();
        assert!(looks_like_root(dir.path()));
    }

    #[test]
    fn run_phase_fails_when_phase_fails() {
        struct Failing;
        impl Task for Failing {
            fn name(&self) -> &str {
                "failing"
            }
            fn run(&self, _ctx: &Context) -> Result<tasks::TaskResult> {
                anyhow::bail!("permission denied")
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().to_path_buf()),
            dry_run: false,
        };
        let log = Arc::new(Logger::new("test"));
        assert!(run_phase(&Failing, &global, &log).is_err());
    }
}
