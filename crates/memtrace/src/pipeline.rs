//! Instrumentation pipeline - text → module → passes → text.

use std::path::Path;

use memtrace_ir::{Module, verify_module};
use memtrace_pass::PassRegistry;

use crate::parse::parse_module;
use crate::{Error, Result};

/// Instrumentation pipeline.
pub struct Pipeline {
    /// Module under transformation.
    pub module: Module,
    /// Registry used to resolve pass identifiers.
    pub registry: PassRegistry,
}

impl Pipeline {
    /// Create a pipeline around an already-built module.
    #[must_use]
    pub fn new(module: Module) -> Self {
        Self {
            module,
            registry: PassRegistry::with_default_passes(),
        }
    }

    /// Parse a module from textual IR.
    pub fn from_source(source: &str) -> Result<Self> {
        Ok(Self::new(parse_module(source)?))
    }

    /// Read and parse a module from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_source(&source)
    }

    /// Check the module against the IR well-formedness rules.
    pub fn verify(&self) -> Result<()> {
        verify_module(&self.module)?;
        Ok(())
    }

    /// Run one registered pass over the module.
    ///
    /// Returns whether the pass reported a change.
    pub fn run_pass(&mut self, id: &str) -> Result<bool> {
        let Some(mut pass) = self.registry.create(id) else {
            return Err(Error::UnknownPass(id.to_string()));
        };
        Ok(pass.run(&mut self.module))
    }

    /// Render the module back to text.
    #[must_use]
    pub fn render(&self) -> String {
        self.module.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtrace_pass::MEMORY_PROFILER_ID;

    const INPUT: &str = "\
declare @malloc(i64) -> i8*

fn @main() -> i32 {
entry:
    %p = call i8* @malloc(i64 16)
    %q = ptrcast i8* %p to i32*
    store i32 5, i32* %q
    %x = load i32, i32* %q
    ret i32 %x
}
";

    #[test]
    fn test_end_to_end() {
        let mut pipeline = Pipeline::from_source(INPUT).unwrap();
        pipeline.verify().unwrap();

        let changed = pipeline.run_pass(MEMORY_PROFILER_ID).unwrap();
        assert!(changed);
        pipeline.verify().unwrap();

        let text = pipeline.render();
        assert!(text.contains("declare @traceMalloc(i8*, i64) -> void"));
        assert!(text.contains("call void @traceMalloc(i8* %p, i64 16)"));
        assert!(text.contains("call void @traceStore("));
        assert!(text.contains("call void @traceLoad("));
    }

    #[test]
    fn test_unknown_pass() {
        let mut pipeline = Pipeline::from_source(INPUT).unwrap();
        let err = pipeline.run_pass("nope").unwrap_err();
        assert!(matches!(err, Error::UnknownPass(id) if id == "nope"));
    }
}
