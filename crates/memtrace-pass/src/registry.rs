//! Explicit pass registration.
//!
//! The registry is an owned table built by the driver at startup. There is
//! no global state: constructing two registries gives two independent
//! tables.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::pass::ModulePass;
use crate::profiler::{MEMORY_PROFILER_ID, MEMORY_PROFILER_NAME, MemoryProfiler};

/// Factory producing a fresh pass instance.
pub type PassFactory = fn() -> Box<dyn ModulePass>;

/// Registration failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("pass '{0}' is already registered")]
    Duplicate(&'static str),
}

/// A registered pass: stable identifier, display name, factory.
pub struct PassEntry {
    /// Identifier used for lookup and CLI selection.
    pub id: &'static str,
    /// Human-readable name for listings.
    pub name: &'static str,
    factory: PassFactory,
}

/// Table of registered passes, in registration order.
pub struct PassRegistry {
    entries: Vec<PassEntry>,
    index: FxHashMap<&'static str, usize>,
}

impl Default for PassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Create a registry with the built-in passes registered.
    pub fn with_default_passes() -> Self {
        let mut registry = Self::new();
        registry
            .register(MEMORY_PROFILER_ID, MEMORY_PROFILER_NAME, || {
                Box::new(MemoryProfiler::new())
            })
            .expect("built-in pass identifiers are unique");
        registry
    }

    /// Register a pass under a stable identifier.
    pub fn register(
        &mut self,
        id: &'static str,
        name: &'static str,
        factory: PassFactory,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(PassEntry { id, name, factory });
        Ok(())
    }

    /// Instantiate a registered pass by identifier.
    pub fn create(&self, id: &str) -> Option<Box<dyn ModulePass>> {
        let entry = self.entries.get(*self.index.get(id)?)?;
        Some((entry.factory)())
    }

    /// Display name of a registered pass.
    pub fn name(&self, id: &str) -> Option<&'static str> {
        self.entries.get(*self.index.get(id)?).map(|e| e.name)
    }

    /// Iterate entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &PassEntry> {
        self.entries.iter()
    }

    /// Number of registered passes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no passes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_passes() {
        let registry = PassRegistry::with_default_passes();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.name("mempf"), Some("MemoryProfiler Pass"));
        assert!(registry.create("mempf").is_some());
        assert!(registry.create("nope").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = PassRegistry::with_default_passes();
        let result = registry.register(MEMORY_PROFILER_ID, "again", || {
            Box::new(MemoryProfiler::new())
        });
        assert_eq!(result, Err(RegistryError::Duplicate("mempf")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_order() {
        let registry = PassRegistry::with_default_passes();
        let ids: Vec<&str> = registry.entries().map(|e| e.id).collect();
        assert_eq!(ids, ["mempf"]);
    }
}
