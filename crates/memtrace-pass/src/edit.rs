//! Deferred instruction-list edits.
//!
//! A classifier walks a snapshot of a block's instruction handles while new
//! instructions are queued against their anchors. Materializing afterwards
//! rebuilds the list in one step, so the walk never observes inserted code.

use memtrace_ir::InstrId;
use rustc_hash::FxHashMap;

/// Pending insertions for one block, keyed by anchor instruction.
///
/// Multiple insertions at the same anchor keep their queue order.
#[derive(Debug, Default)]
pub struct BlockEdits {
    before: FxHashMap<InstrId, Vec<InstrId>>,
    after: FxHashMap<InstrId, Vec<InstrId>>,
    count: usize,
}

impl BlockEdits {
    /// Create an empty edit set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `id` for insertion immediately before `anchor`.
    pub fn insert_before(&mut self, anchor: InstrId, id: InstrId) {
        self.before.entry(anchor).or_default().push(id);
        self.count += 1;
    }

    /// Queue `id` for insertion immediately after `anchor`.
    pub fn insert_after(&mut self, anchor: InstrId, id: InstrId) {
        self.after.entry(anchor).or_default().push(id);
        self.count += 1;
    }

    /// Check if any edits are queued.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Rebuild an instruction sequence with all queued insertions applied.
    /// Edits anchored to handles absent from `original` are dropped.
    #[must_use]
    pub fn materialize(mut self, original: &[InstrId]) -> Vec<InstrId> {
        let mut out = Vec::with_capacity(original.len() + self.count);
        for &id in original {
            if let Some(ids) = self.before.remove(&id) {
                out.extend(ids);
            }
            out.push(id);
            if let Some(ids) = self.after.remove(&id) {
                out.extend(ids);
            }
        }
        out
    }
}
