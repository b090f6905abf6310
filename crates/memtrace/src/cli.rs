//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "memtrace")]
#[command(about = "Memory access instrumentation for textual IR modules")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run instrumentation passes over a module
    Instrument {
        /// Input IR file
        #[arg(value_name = "IR")]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pass to run, repeatable and applied in order
        #[arg(long = "pass", value_name = "ID", default_value = "mempf")]
        passes: Vec<String>,

        /// Verify the instrumented module again after the passes
        #[arg(long)]
        verify: bool,
    },
    /// List the registered passes
    Passes,
    /// Parse a module and check the IR well-formedness rules
    Verify {
        /// Input IR file
        #[arg(value_name = "IR")]
        input: PathBuf,
    },
}
