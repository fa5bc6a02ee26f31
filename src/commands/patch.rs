//! Command: reconcile live files toward the package.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::tasks::patch::ApplyPatch;

/// Run the patch command.
///
/// # Errors
///
/// Returns an error if setup fails, the manifest is malformed, or recorded
/// ownership cannot be re-applied.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    super::run_phase(&ApplyPatch, global, log)
}
