//! Intermediate representation for the memtrace instrumentation toolkit.
//!
//! This crate provides pure IR types with no knowledge of any particular
//! transformation. Passes over the IR live in `memtrace-pass`.

mod block;
mod builder;
mod function;
mod instr;
mod layout;
mod module;
mod print;
mod types;
mod value;
mod verify;

pub use block::*;
pub use builder::*;
pub use function::*;
pub use instr::*;
pub use layout::*;
pub use module::*;
pub use print::*;
pub use types::*;
pub use value::*;
pub use verify::*;
