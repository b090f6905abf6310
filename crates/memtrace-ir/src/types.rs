//! Value and aggregate types.

use std::fmt;

/// A first-class value type, rendered in the textual form the parser accepts
/// (`i32`, `i8*`, `[4 x i32]`, `{ i32, i64 }`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    /// No value (function returns, side-effect-only calls).
    Void,
    /// 1-bit boolean.
    I1,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    /// Pointer to a pointee type.
    Ptr(Box<Type>),
    /// Fixed-length array.
    Array {
        /// Element type.
        elem: Box<Type>,
        /// Element count.
        len: u64,
    },
    /// Struct with packed fields.
    Struct(Vec<Type>),
}

impl Type {
    /// Wrap this type in a pointer.
    #[must_use]
    pub fn ptr_to(self) -> Self {
        Self::Ptr(Box::new(self))
    }

    /// The byte-addressed pointer type (`i8*`) trace hooks take addresses as.
    #[must_use]
    pub fn byte_ptr() -> Self {
        Self::Ptr(Box::new(Self::I8))
    }

    /// Check if this is a pointer type.
    pub const fn is_pointer(&self) -> bool {
        matches!(self, Self::Ptr(_))
    }

    /// Get the pointee type if this is a pointer.
    pub fn pointee(&self) -> Option<&Self> {
        match self {
            Self::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    /// Check if this is one of the integer types (including `i1`).
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::I1 | Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Check if this is a float type.
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::I1 => write!(f, "i1"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::Ptr(inner) => write!(f, "{inner}*"),
            Self::Array { elem, len } => write!(f, "[{len} x {elem}]"),
            Self::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, " }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Type::I32.to_string(), "i32");
        assert_eq!(Type::byte_ptr().to_string(), "i8*");
        assert_eq!(Type::I64.ptr_to().ptr_to().to_string(), "i64**");
        assert_eq!(
            Type::Array {
                elem: Box::new(Type::I32),
                len: 4
            }
            .to_string(),
            "[4 x i32]"
        );
        assert_eq!(
            Type::Struct(vec![Type::I32, Type::I64.ptr_to()]).to_string(),
            "{ i32, i64* }"
        );
    }

    #[test]
    fn test_pointee() {
        let ty = Type::I32.ptr_to();
        assert!(ty.is_pointer());
        assert_eq!(ty.pointee(), Some(&Type::I32));
        assert_eq!(Type::I32.pointee(), None);
    }
}
