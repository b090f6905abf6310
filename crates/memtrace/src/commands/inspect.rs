//! Passes and verify commands.

use std::path::Path;

use memtrace::{PassRegistry, Pipeline};
use tracing::{error, info};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Handle the `passes` command.
pub fn cmd_passes() -> i32 {
    let registry = PassRegistry::with_default_passes();
    for entry in registry.entries() {
        println!("{:<12} {}", entry.id, entry.name);
    }
    EXIT_SUCCESS
}

/// Handle the `verify` command.
pub fn cmd_verify(input: &Path) -> i32 {
    let pipeline = match Pipeline::from_path(input) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(error = %e, "loading failed");
            return EXIT_FAILURE;
        }
    };

    match pipeline.verify() {
        Ok(()) => {
            info!(input = %input.display(), "module is well-formed");
            EXIT_SUCCESS
        }
        Err(e) => {
            error!(error = %e, "verification failed");
            EXIT_FAILURE
        }
    }
}
