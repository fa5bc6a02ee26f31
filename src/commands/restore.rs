//! Command: return patched files to their pre-patch content.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::tasks::restore::RestoreBackups;

/// Run the restore command.
///
/// # Errors
///
/// Returns an error if setup fails or the manifest is malformed.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    super::run_phase(&RestoreBackups, global, log)
}
