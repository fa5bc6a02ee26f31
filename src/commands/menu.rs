//! Command: interactive phase selection.
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::platform::Platform;
use crate::tasks::Task;
use crate::tasks::build::BuildPackage;
use crate::tasks::patch::ApplyPatch;
use crate::tasks::restore::RestoreBackups;

const INVALID: &str = "\nInvalid option, try again!\n";

/// A phase picked from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Rebuild the manifest and package.
    Build,
    /// Apply the package to the live system.
    Patch,
    /// Put backups back.
    Restore,
}

impl Choice {
    const fn prompt(self) -> &'static str {
        match self {
            Self::Build => "\nProceed with building a patch? ",
            Self::Patch => "\nProceed with patching? ",
            Self::Restore => "\nProceed with restoring files to their pre-patched state? ",
        }
    }

    fn task(self) -> &'static dyn Task {
        match self {
            Self::Build => &BuildPackage,
            Self::Patch => &ApplyPatch,
            Self::Restore => &RestoreBackups,
        }
    }
}

/// Read one line, trimmed. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).context("reading input")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask a yes/no question. Anything but a recognised answer counts as no.
fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<bool> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let answer = read_line(input)?;
    let yes = match answer.as_deref() {
        Some("y" | "Y" | "yes" | "YES") => true,
        Some("n" | "N" | "no" | "NO") | None => false,
        Some(_) => {
            write!(out, "{INVALID}")?;
            false
        }
    };
    writeln!(out)?;
    Ok(yes)
}

/// Show the menu until the operator exits, running `action` for each
/// confirmed choice.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or written, or if
/// `action` fails.
pub fn drive<R, W, F>(input: &mut R, out: &mut W, platform: &Platform, mut action: F) -> Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(Choice) -> Result<()>,
{
    loop {
        writeln!(out, "Patching Utility Main Menu ({})", platform.os)?;
        writeln!(out, "\t1. Build")?;
        writeln!(out, "\t2. Patch")?;
        writeln!(out, "\t3. Restore")?;
        writeln!(out, "\t4. Exit")?;
        write!(out, "Select an option: ")?;
        out.flush()?;

        let choice = match read_line(input)?.as_deref() {
            Some("1") => Choice::Build,
            Some("2") => Choice::Patch,
            Some("3") => Choice::Restore,
            Some("4") | None => {
                write!(out, "\nBye!\n")?;
                return Ok(());
            }
            Some(_) => {
                writeln!(out, "{INVALID}")?;
                continue;
            }
        };

        if confirm(input, out, choice.prompt())? {
            action(choice)?;
        }
    }
}

/// Run the interactive menu on stdin/stdout.
///
/// # Errors
///
/// Returns an error if setup fails or a phase aborts.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let platform = Platform::detect();

    drive(&mut input, &mut out, &platform, |choice| {
        log.clear_tasks();
        super::run_phase(choice.task(), global, log)
    })
}
