//! Command: rebuild the manifest and package from `manifest.cfg`.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::tasks::build::BuildPackage;

/// Run the build command.
///
/// # Errors
///
/// Returns an error if setup fails or the manifest cannot be written.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    super::run_phase(&BuildPackage, global, log)
}
