//! Operand values and constants.

use crate::instr::InstrId;
use crate::types::Type;

/// Payload of a constant.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstKind {
    /// Integer payload, sign-extended to 64 bits.
    Int(i64),
    /// Float payload, stored as raw bits.
    Float(u64),
    /// Null pointer.
    Null,
}

/// A typed constant.
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    /// Type of the constant.
    pub ty: Type,
    /// Payload.
    pub kind: ConstKind,
}

impl Constant {
    /// Create an integer constant.
    pub const fn int(ty: Type, value: i64) -> Self {
        Self {
            ty,
            kind: ConstKind::Int(value),
        }
    }

    /// Create a float constant from raw bits.
    pub const fn float(ty: Type, bits: u64) -> Self {
        Self {
            ty,
            kind: ConstKind::Float(bits),
        }
    }

    /// Create a null pointer constant.
    pub const fn null(ty: Type) -> Self {
        Self {
            ty,
            kind: ConstKind::Null,
        }
    }
}

/// An operand: an instruction result, a function parameter, or a constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Result of an instruction in the enclosing function.
    Instr(InstrId),
    /// Function parameter, by index.
    Param(u32),
    /// Inline constant.
    Const(Constant),
}

impl Value {
    /// Integer constant operand.
    pub const fn int(ty: Type, value: i64) -> Self {
        Self::Const(Constant::int(ty, value))
    }

    /// Null pointer operand.
    pub const fn null(ty: Type) -> Self {
        Self::Const(Constant::null(ty))
    }

    /// Check if this operand is a constant.
    pub const fn is_const(&self) -> bool {
        matches!(self, Self::Const(_))
    }
}
