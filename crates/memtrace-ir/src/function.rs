//! Functions and the instruction arena.

use crate::block::{Block, BlockId};
use crate::instr::{Instr, InstrId};
use crate::types::Type;
use crate::value::Value;

/// A named function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    /// Name as written in the source (without the `%`).
    pub name: String,
    /// Parameter type.
    pub ty: Type,
}

impl Param {
    /// Create a parameter.
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

/// A function definition.
///
/// Instructions live in an arena indexed by [`InstrId`]; blocks hold handles
/// in execution order. Arena slots are never reused or compacted, so handles
/// stay stable while blocks are edited.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    /// Symbol name, without the leading `@`.
    pub name: String,
    /// Parameters.
    pub params: Vec<Param>,
    /// Return type.
    pub ret: Type,
    /// Blocks in layout order; the first is the entry.
    pub blocks: Vec<Block>,
    instrs: Vec<Instr>,
}

impl Function {
    /// Create an empty function.
    pub fn new(name: &str, params: Vec<Param>, ret: Type) -> Self {
        Self {
            name: name.to_string(),
            params,
            ret,
            blocks: Vec::new(),
            instrs: Vec::new(),
        }
    }

    /// Add an instruction to the arena. The instruction is not yet part of
    /// any block; the caller places the returned handle.
    pub fn alloc_instr(&mut self, instr: Instr) -> InstrId {
        let id = InstrId(self.instrs.len() as u32);
        self.instrs.push(instr);
        id
    }

    /// Get an instruction by handle.
    ///
    /// # Panics
    /// Panics if the handle was not produced by this function's arena.
    pub fn instr(&self, id: InstrId) -> &Instr {
        &self.instrs[id.index()]
    }

    /// Get an instruction by handle, or `None` for a foreign handle.
    pub fn get_instr(&self, id: InstrId) -> Option<&Instr> {
        self.instrs.get(id.index())
    }

    /// Get a mutable instruction by handle.
    ///
    /// # Panics
    /// Panics if the handle was not produced by this function's arena.
    pub fn instr_mut(&mut self, id: InstrId) -> &mut Instr {
        &mut self.instrs[id.index()]
    }

    /// Number of arena slots (instructions ever created).
    pub fn instr_count(&self) -> usize {
        self.instrs.len()
    }

    /// Add a block and get its handle.
    pub fn add_block(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(block);
        id
    }

    /// Look up a block handle by label.
    pub fn block_by_label(&self, label: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|block| block.label == label)
            .map(|i| BlockId(i as u32))
    }

    /// Type of a value in this function's context.
    ///
    /// `None` for references to side-effect-only instructions, parameter
    /// indices out of range, or foreign handles.
    pub fn value_type(&self, value: &Value) -> Option<Type> {
        match value {
            Value::Const(constant) => Some(constant.ty.clone()),
            Value::Param(index) => self.params.get(*index as usize).map(|p| p.ty.clone()),
            Value::Instr(id) => self.get_instr(*id).and_then(|i| i.kind.result_type()),
        }
    }

    /// Iterate instruction handles of every block, in program order.
    pub fn program_order(&self) -> impl Iterator<Item = InstrId> + '_ {
        self.blocks.iter().flat_map(|block| block.instrs.iter().copied())
    }
}
