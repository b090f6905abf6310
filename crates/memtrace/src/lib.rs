//! memtrace - memory access instrumentation for a small typed IR.
//!
//! Parses textual IR modules, runs registered module passes over them, and
//! prints the transformed result.
//!
//! # Example
//!
//! ```ignore
//! use memtrace::{Pipeline, MEMORY_PROFILER_ID};
//!
//! let mut pipeline = Pipeline::from_path(Path::new("input.ir"))?;
//! pipeline.run_pass(MEMORY_PROFILER_ID)?;
//! println!("{}", pipeline.render());
//! ```

// Re-export from sub-crates
pub use memtrace_ir::{
    BinOp, Block, BlockId, Callee, ConstKind, Constant, DataLayout, FuncDecl, Function,
    FunctionBuilder, IcmpPred, Instr, InstrId, InstrKind, Module, Param, Terminator, Type, Value,
    VerifyError, render_instr, render_value, result_names, verify_module,
};
pub use memtrace_pass::{
    Analysis, BlockEdits, MEMORY_PROFILER_ID, MEMORY_PROFILER_NAME, MemoryProfiler, ModulePass,
    PassEntry, PassFactory, PassRegistry, PreservedAnalyses, RegistryError, TraceHook,
};

mod parse;
pub use parse::{ParseError, parse_module};

mod pipeline;
pub use pipeline::Pipeline;

use thiserror::Error;

/// Driver errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Verification failed: {0}")]
    Verify(#[from] VerifyError),
    #[error("Unknown pass '{0}'")]
    UnknownPass(String),
}

pub type Result<T> = std::result::Result<T, Error>;
