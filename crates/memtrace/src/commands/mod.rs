//! Command implementations.
//!
//! Each submodule handles a specific CLI command.

mod inspect;
mod instrument;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Instrument { .. } => handle_instrument(cli),
        Commands::Passes => inspect::cmd_passes(),
        Commands::Verify { .. } => handle_verify(cli),
    }
}

fn handle_instrument(cli: &Cli) -> i32 {
    let Commands::Instrument {
        input,
        output,
        passes,
        verify,
    } = &cli.command
    else {
        unreachable!("instrument command variant mismatch");
    };

    instrument::cmd_instrument(input, output.as_deref(), passes, *verify)
}

fn handle_verify(cli: &Cli) -> i32 {
    let Commands::Verify { input } = &cli.command else {
        unreachable!("verify command variant mismatch");
    };

    inspect::cmd_verify(input)
}
