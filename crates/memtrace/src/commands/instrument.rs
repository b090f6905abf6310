//! Instrument command.

use std::path::Path;

use memtrace::Pipeline;
use tracing::{error, info};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Handle the `instrument` command.
pub fn cmd_instrument(
    input: &Path,
    output: Option<&Path>,
    passes: &[String],
    verify: bool,
) -> i32 {
    info!(input = %input.display(), "instrumenting");

    let mut pipeline = match Pipeline::from_path(input) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(error = %e, "loading failed");
            return EXIT_FAILURE;
        }
    };

    // Passes assume well-formed input.
    if let Err(e) = pipeline.verify() {
        error!(error = %e, "input module is malformed");
        return EXIT_FAILURE;
    }

    for id in passes {
        match pipeline.run_pass(id) {
            Ok(changed) => info!(pass = %id, changed, "pass finished"),
            Err(e) => {
                error!(error = %e, "pass failed");
                return EXIT_FAILURE;
            }
        }
    }

    if verify {
        if let Err(e) = pipeline.verify() {
            error!(error = %e, "instrumented module is malformed");
            return EXIT_FAILURE;
        }
    }

    let text = pipeline.render();
    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &text) {
                error!(error = %e, "writing output failed");
                return EXIT_FAILURE;
            }
            info!(output = %path.display(), "done");
        }
        None => print!("{text}"),
    }
    EXIT_SUCCESS
}
