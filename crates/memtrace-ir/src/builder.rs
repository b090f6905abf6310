//! Fluent construction of functions.

use crate::block::{Block, BlockId, Terminator};
use crate::function::{Function, Param};
use crate::instr::{BinOp, Callee, IcmpPred, Instr, InstrId, InstrKind};
use crate::types::Type;
use crate::value::Value;

/// Builder for assembling a [`Function`] block by block.
///
/// Instructions append to the block opened by the most recent [`block`]
/// call. Each instruction method returns the new handle so results can be
/// referenced as [`Value::Instr`].
///
/// [`block`]: FunctionBuilder::block
pub struct FunctionBuilder {
    function: Function,
    current: Option<BlockId>,
}

impl FunctionBuilder {
    /// Start building a function.
    pub fn new(name: &str, params: Vec<Param>, ret: Type) -> Self {
        Self {
            function: Function::new(name, params, ret),
            current: None,
        }
    }

    /// Open a new block; subsequent instructions append to it.
    pub fn block(&mut self, label: &str) -> BlockId {
        let id = self.function.add_block(Block::new(label));
        self.current = Some(id);
        id
    }

    /// Append a prepared instruction to the current block.
    ///
    /// # Panics
    /// Panics if no block has been opened.
    pub fn push(&mut self, instr: Instr) -> InstrId {
        let block = self.current.expect("no open block");
        let id = self.function.alloc_instr(instr);
        self.function.blocks[block.index()].instrs.push(id);
        id
    }

    /// Append a call to a named symbol.
    pub fn call_symbol(&mut self, ret: Type, name: &str, args: Vec<Value>) -> InstrId {
        self.push(Instr::new(InstrKind::Call {
            ret,
            callee: Callee::Symbol(name.to_string()),
            args,
        }))
    }

    /// Append an indirect call through a pointer value.
    pub fn call_value(&mut self, ret: Type, callee: Value, args: Vec<Value>) -> InstrId {
        self.push(Instr::new(InstrKind::Call {
            ret,
            callee: Callee::Value(callee),
            args,
        }))
    }

    /// Append a load.
    pub fn load(&mut self, ty: Type, addr: Value) -> InstrId {
        self.push(Instr::new(InstrKind::Load { ty, addr }))
    }

    /// Append a store.
    pub fn store(&mut self, ty: Type, value: Value, addr: Value) -> InstrId {
        self.push(Instr::new(InstrKind::Store { ty, value, addr }))
    }

    /// Append a stack allocation.
    pub fn alloca(&mut self, ty: Type) -> InstrId {
        self.push(Instr::new(InstrKind::Alloca { ty }))
    }

    /// Append a pointer cast.
    pub fn ptr_cast(&mut self, to: Type, value: Value) -> InstrId {
        self.push(Instr::new(InstrKind::PtrCast { to, value }))
    }

    /// Append an integer binary operation.
    pub fn binary(&mut self, op: BinOp, ty: Type, lhs: Value, rhs: Value) -> InstrId {
        self.push(Instr::new(InstrKind::Binary { op, ty, lhs, rhs }))
    }

    /// Append an integer comparison.
    pub fn icmp(&mut self, pred: IcmpPred, ty: Type, lhs: Value, rhs: Value) -> InstrId {
        self.push(Instr::new(InstrKind::Icmp { pred, ty, lhs, rhs }))
    }

    /// Terminate the current block with a return.
    ///
    /// # Panics
    /// Panics if no block has been opened.
    pub fn ret(&mut self, value: Option<Value>) {
        self.set_terminator_current(Terminator::Ret(value));
    }

    /// Terminate the current block with an unconditional branch.
    ///
    /// # Panics
    /// Panics if no block has been opened.
    pub fn br(&mut self, target: BlockId) {
        self.set_terminator_current(Terminator::Br(target));
    }

    /// Terminate the current block with a conditional branch.
    ///
    /// # Panics
    /// Panics if no block has been opened.
    pub fn cond_br(&mut self, cond: Value, then_blk: BlockId, else_blk: BlockId) {
        self.set_terminator_current(Terminator::CondBr {
            cond,
            then_blk,
            else_blk,
        });
    }

    /// Overwrite the terminator of a specific block.
    pub fn set_terminator(&mut self, block: BlockId, terminator: Terminator) {
        self.function.blocks[block.index()].terminator = terminator;
    }

    /// Finish and take the function.
    #[must_use]
    pub fn finish(self) -> Function {
        self.function
    }

    fn set_terminator_current(&mut self, terminator: Terminator) {
        let block = self.current.expect("no open block");
        self.set_terminator(block, terminator);
    }
}
