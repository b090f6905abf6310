//! Trace runtime entry points.
//!
//! The instrumented program reports memory events through three externally
//! defined C functions, each taking the event address as `i8*` and a size
//! in bytes as `i64`.

use memtrace_ir::{FuncDecl, Type};

/// One trace hook of the runtime ABI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceHook {
    /// Reports a heap allocation: `(result pointer, requested size)`.
    Malloc,
    /// Reports a read: `(address, size of the loaded type)`.
    Load,
    /// Reports a write: `(address, size of the stored type)`.
    Store,
}

impl TraceHook {
    /// All hooks, in declaration order.
    pub const ALL: [Self; 3] = [Self::Malloc, Self::Load, Self::Store];

    /// Symbol name of the runtime entry point.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Malloc => "traceMalloc",
            Self::Load => "traceLoad",
            Self::Store => "traceStore",
        }
    }

    /// Declaration carried into instrumented modules: `(i8*, i64) -> void`.
    pub fn decl(self) -> FuncDecl {
        FuncDecl::new(
            self.symbol(),
            vec![Type::byte_ptr(), Type::I64],
            Type::Void,
        )
    }
}
