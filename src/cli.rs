use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the file patching utility.
#[derive(Parser, Debug)]
#[command(
    name = "filepatch",
    about = "Build, apply and roll back file patches driven by a manifest",
    version
)]
pub struct Cli {
    /// Phase to run; the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The selected command, defaulting to the menu.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Menu)
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without writing anything
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the tool root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Record tracked paths into a manifest and package
    Build,
    /// Reconcile live files toward the package, backing up what changes
    Patch,
    /// Put backed-up files back in place
    Restore,
    /// Choose a phase interactively
    Menu,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Patch => "patch",
            Self::Restore => "restore",
            Self::Menu => "menu",
            Self::Version => "version",
        }
    }
}
