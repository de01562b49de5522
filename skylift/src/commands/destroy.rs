use std::env;
use std::path::PathBuf;

use skylift_core::error::Result;
use skylift_core::workspace::FIXED_WORKDIR_NAME;
use skylift_core::{sky_error, sky_println, sky_success};

use crate::orchestrator;

/// Teardown is best-effort: a failure is reported on the error stream but
/// the command itself does not abort, matching the end-user expectation
/// that `destroy` cleans up as much as it can.
pub fn handle_destroy(auto_approve: bool, workspace: Option<PathBuf>) -> Result<()> {
    let workdir = match workspace {
        Some(dir) => dir,
        None => env::current_dir()?.join(FIXED_WORKDIR_NAME),
    };

    if !workdir.exists() {
        sky_println!("Working directory not found. Nothing to destroy.");
        return Ok(());
    }

    sky_println!("Destroying all resources in {}", workdir.display());
    match orchestrator::destroy(&workdir, auto_approve, &orchestrator::terraform_factory) {
        Ok(()) => sky_success!("De-provisioning complete"),
        Err(e) => sky_error!("An error occurred during de-provisioning: {}", e),
    }
    Ok(())
}
