//! Pipeline API example.
//!
//! Demonstrates the lower-level Pipeline API for fine-grained control over:
//!
//! - module loading and verification
//! - instruction inspection
//! - pass selection through the registry
//!
//! # Pipeline Stages
//!
//! ```text
//! Textual IR
//!     │
//!     ▼
//! ┌──────────────────┐
//! │  parse_module()  │  Scan and parse the textual form
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  verify_module() │  Structural and type checks
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │    run_pass()    │  Rewrite via a registered pass
//! └────────┬─────────┘
//!          │
//!          ▼
//!    Instrumented IR
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --example pipeline_api -- programs/counter_loop.ir
//! ```

use std::path::PathBuf;

use memtrace::{InstrKind, MEMORY_PROFILER_ID, Pipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <ir_path>", args[0]);
        std::process::exit(1);
    }

    let input = PathBuf::from(&args[1]);

    // Stage 1: Parse
    println!("=== Stage 1: Parse ===");
    let mut pipeline = Pipeline::from_path(&input)?;

    println!("Declarations: {}", pipeline.module.declarations.len());
    for decl in &pipeline.module.declarations {
        println!("  @{}", decl.name);
    }
    println!("Functions: {}", pipeline.module.functions.len());
    for function in &pipeline.module.functions {
        println!("  @{} ({} blocks)", function.name, function.blocks.len());
    }

    // Stage 2: Verify
    println!("\n=== Stage 2: Verify ===");
    pipeline.verify()?;
    println!("Module is well-formed");

    // Stage 3: Inspect memory traffic
    println!("\n=== Stage 3: Inspect ===");
    let mut loads = 0;
    let mut stores = 0;
    let mut mallocs = 0;

    for function in &pipeline.module.functions {
        for id in function.program_order() {
            match &function.instr(id).kind {
                InstrKind::Load { .. } => loads += 1,
                InstrKind::Store { .. } => stores += 1,
                InstrKind::Call { callee, .. } if callee.symbol() == Some("malloc") => {
                    mallocs += 1;
                }
                _ => {}
            }
        }
    }

    println!("Memory traffic:");
    println!("  Mallocs: {mallocs}");
    println!("  Loads: {loads}");
    println!("  Stores: {stores}");

    // Stage 4: Instrument
    println!("\n=== Stage 4: Instrument ===");
    println!("Registered passes:");
    for entry in pipeline.registry.entries() {
        println!("  {:<12} {}", entry.id, entry.name);
    }

    let changed = pipeline.run_pass(MEMORY_PROFILER_ID)?;
    println!("Pass reported changed = {changed}");

    // Stage 5: Render
    println!("\n=== Stage 5: Render ===");
    pipeline.verify()?;
    print!("{}", pipeline.render());

    Ok(())
}
