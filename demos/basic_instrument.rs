//! Basic instrumentation example.
//!
//! Demonstrates the simplest usage of memtrace: loading a textual IR module,
//! running the memory profiler over it, and printing the instrumented form.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example basic_instrument -- programs/heap_round_trip.ir
//! ```
//!
//! The output module gains three external declarations (`traceMalloc`,
//! `traceLoad`, `traceStore`) and one trace call per heap allocation, load,
//! and store.

use std::path::PathBuf;

use memtrace::{MEMORY_PROFILER_ID, Pipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <ir_path>", args[0]);
        std::process::exit(1);
    }

    let input = PathBuf::from(&args[1]);

    let mut pipeline = Pipeline::from_path(&input)?;
    pipeline.verify()?;
    pipeline.run_pass(MEMORY_PROFILER_ID)?;

    print!("{}", pipeline.render());
    Ok(())
}
