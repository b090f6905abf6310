//! Pass infrastructure and the memory-access instrumentation pass.
//!
//! Passes rewrite a [`memtrace_ir::Module`] in place and declare which
//! analyses they leave intact. The [`PassRegistry`] maps stable identifiers
//! to factories; drivers build one at startup instead of relying on global
//! registration side effects.

mod edit;
mod hooks;
mod pass;
mod profiler;
mod registry;

pub use edit::*;
pub use hooks::*;
pub use pass::*;
pub use profiler::*;
pub use registry::*;
