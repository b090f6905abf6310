//! Basic blocks and terminators.

use crate::instr::InstrId;
use crate::value::Value;

/// Handle of a block within its function's block list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

impl BlockId {
    /// Index into the block list.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The single exit of a block: a return, or a branch to one or two
/// successor blocks.
///
/// Terminators are not instructions: a block is an instruction sequence
/// followed by exactly one terminator, so inserting after the last
/// instruction is always a plain append.
#[derive(Clone, Debug, PartialEq)]
pub enum Terminator {
    /// Return from the function, with an optional value.
    Ret(Option<Value>),
    /// Unconditional branch.
    Br(BlockId),
    /// Two-way conditional branch on an `i1` value.
    CondBr {
        cond: Value,
        then_blk: BlockId,
        else_blk: BlockId,
    },
}

impl Terminator {
    /// Check if this terminator leaves the function.
    pub const fn is_ret(&self) -> bool {
        matches!(self, Self::Ret(_))
    }

    /// Check if this terminator is a branch of either kind.
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::Br(_) | Self::CondBr { .. })
    }

    /// Block targets of this terminator.
    pub fn targets(&self) -> Vec<BlockId> {
        match self {
            Self::Ret(_) => Vec::new(),
            Self::Br(target) => vec![*target],
            Self::CondBr {
                then_blk, else_blk, ..
            } => vec![*then_blk, *else_blk],
        }
    }
}

/// A basic block: a label, an ordered instruction list, and one terminator.
///
/// Instructions execute top to bottom, then the terminator. The list holds
/// arena handles; the instructions themselves live on the function.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// Label as written in the source.
    pub label: String,
    /// Instruction handles in execution order.
    pub instrs: Vec<InstrId>,
    /// Control-flow exit.
    pub terminator: Terminator,
}

impl Block {
    /// Create an empty block. The terminator starts as `ret void` and is
    /// overwritten when the block is finished.
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            instrs: Vec::new(),
            terminator: Terminator::Ret(None),
        }
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    /// Check if the block has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }
}
