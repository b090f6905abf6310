//! Target data layout for type sizing.

use crate::types::Type;

/// Sizing oracle for a target. Carries the pointer width; everything else is
/// target-independent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataLayout {
    pointer_bits: u32,
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::P64
    }
}

impl DataLayout {
    /// 64-bit pointer target.
    pub const P64: Self = Self { pointer_bits: 64 };
    /// 32-bit pointer target.
    pub const P32: Self = Self { pointer_bits: 32 };

    /// Pointer width in bits.
    pub const fn pointer_bits(self) -> u32 {
        self.pointer_bits
    }

    /// Size of a type in bits.
    ///
    /// Arrays are `len * elem`, structs are the packed sum of their field
    /// widths; aggregate widths saturate at `u64::MAX`. `void` has no size
    /// and reports 0.
    pub fn bit_width(self, ty: &Type) -> u64 {
        match ty {
            Type::Void => 0,
            Type::I1 => 1,
            Type::I8 => 8,
            Type::I16 => 16,
            Type::I32 | Type::F32 => 32,
            Type::I64 | Type::F64 => 64,
            Type::Ptr(_) => u64::from(self.pointer_bits),
            Type::Array { elem, len } => self.bit_width(elem).saturating_mul(*len),
            Type::Struct(fields) => fields
                .iter()
                .map(|field| self.bit_width(field))
                .fold(0, u64::saturating_add),
        }
    }

    /// Size of a type in whole bytes, truncating sub-byte widths (`i1`
    /// sizes to 0 bytes).
    pub fn byte_size(self, ty: &Type) -> u64 {
        self.bit_width(ty) / 8
    }
}
