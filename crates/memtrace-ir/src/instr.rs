//! Instructions.

use crate::types::Type;
use crate::value::Value;

/// Stable handle of an instruction in its function's arena.
///
/// Handles index arena slots, which are never reused, so a handle stays
/// valid across block edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrId(pub u32);

impl InstrId {
    /// Index into the arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Integer binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
}

impl BinOp {
    /// Mnemonic used in the textual form.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
        }
    }
}

/// Integer comparison predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IcmpPred {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl IcmpPred {
    /// Mnemonic used in the textual form.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Slt => "slt",
            Self::Sle => "sle",
            Self::Sgt => "sgt",
            Self::Sge => "sge",
        }
    }
}

/// Callee of a call instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Callee {
    /// Direct call to a named symbol.
    Symbol(String),
    /// Indirect call through a pointer value.
    Value(Value),
}

impl Callee {
    /// Symbol name for a direct call, if this is one.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(name) => Some(name),
            Self::Value(_) => None,
        }
    }
}

/// Instruction payload.
///
/// The enum is closed; code that classifies instructions matches it
/// exhaustively, so adding a variant forces every classifier to decide how
/// to handle it.
#[derive(Clone, Debug, PartialEq)]
pub enum InstrKind {
    /// Function call. `ret` is the callee's return type.
    Call {
        ret: Type,
        callee: Callee,
        args: Vec<Value>,
    },
    /// Read a `ty` from `addr`.
    Load { ty: Type, addr: Value },
    /// Write `value` (of type `ty`) to `addr`.
    Store { ty: Type, value: Value, addr: Value },
    /// Reserve a stack slot for `ty`; yields a pointer to it.
    Alloca { ty: Type },
    /// Reinterpret a pointer as another pointer type.
    PtrCast { to: Type, value: Value },
    /// Integer arithmetic or bitwise operation.
    Binary {
        op: BinOp,
        ty: Type,
        lhs: Value,
        rhs: Value,
    },
    /// Integer comparison; yields `i1`.
    Icmp {
        pred: IcmpPred,
        ty: Type,
        lhs: Value,
        rhs: Value,
    },
}

impl InstrKind {
    /// Type of the value this instruction produces, or `None` for
    /// side-effect-only instructions.
    pub fn result_type(&self) -> Option<Type> {
        match self {
            Self::Call { ret: Type::Void, .. } | Self::Store { .. } => None,
            Self::Call { ret, .. } => Some(ret.clone()),
            Self::Load { ty, .. } | Self::Binary { ty, .. } => Some(ty.clone()),
            Self::Alloca { ty } => Some(ty.clone().ptr_to()),
            Self::PtrCast { to, .. } => Some(to.clone()),
            Self::Icmp { .. } => Some(Type::I1),
        }
    }
}

/// A single instruction: payload plus optional result name and source line.
#[derive(Clone, Debug, PartialEq)]
pub struct Instr {
    /// Payload.
    pub kind: InstrKind,
    /// Result name as written in the source (without the `%`). Unnamed
    /// results are numbered when printing.
    pub name: Option<String>,
    /// Source line from the front end (`!line N` in the textual form).
    pub line: Option<u32>,
}

impl Instr {
    /// Create an unnamed instruction.
    pub const fn new(kind: InstrKind) -> Self {
        Self {
            kind,
            name: None,
            line: None,
        }
    }

    /// Attach a result name.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Attach a source line.
    #[must_use]
    pub const fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}
