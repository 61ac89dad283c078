use arrow_schema::DataType;

use crate::{GpuArrowError, Result};

/// Fixed-width element types a column's data buffer can be viewed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    // Integer types
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,

    // Floating point types
    Float32,
    Float64,
}

impl ElementType {
    /// Resolve a (kind, bit-width) pair from column metadata to a signed element type.
    ///
    /// Recognized kinds are `"Int"` (8, 16, 32, 64) and `"FloatingPoint"`
    /// (32, 64). Anything else is an [`GpuArrowError::UnsupportedType`].
    pub fn resolve(kind: &str, bitwidth: u32) -> Result<Self> {
        Self::resolve_signed(kind, bitwidth, true)
    }

    /// Resolve a (kind, bit-width) pair, honouring the signedness flag for `"Int"`.
    ///
    /// The flag is ignored for floating point kinds.
    pub fn resolve_signed(kind: &str, bitwidth: u32, is_signed: bool) -> Result<Self> {
        let resolved = match (kind, bitwidth, is_signed) {
            ("Int", 8, true) => ElementType::Int8,
            ("Int", 16, true) => ElementType::Int16,
            ("Int", 32, true) => ElementType::Int32,
            ("Int", 64, true) => ElementType::Int64,
            ("Int", 8, false) => ElementType::UInt8,
            ("Int", 16, false) => ElementType::UInt16,
            ("Int", 32, false) => ElementType::UInt32,
            ("Int", 64, false) => ElementType::UInt64,
            ("FloatingPoint", 32, _) => ElementType::Float32,
            ("FloatingPoint", 64, _) => ElementType::Float64,
            _ => return Err(GpuArrowError::unsupported_type(kind, bitwidth)),
        };
        Ok(resolved)
    }

    /// Get the type name for display
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementType::Int8 => "Int8",
            ElementType::Int16 => "Int16",
            ElementType::Int32 => "Int32",
            ElementType::Int64 => "Int64",
            ElementType::UInt8 => "UInt8",
            ElementType::UInt16 => "UInt16",
            ElementType::UInt32 => "UInt32",
            ElementType::UInt64 => "UInt64",
            ElementType::Float32 => "Float32",
            ElementType::Float64 => "Float64",
        }
    }

    /// Size of one element in bytes
    pub fn byte_width(&self) -> usize {
        match self {
            ElementType::Int8 | ElementType::UInt8 => 1,
            ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => 4,
            ElementType::Int64 | ElementType::UInt64 | ElementType::Float64 => 8,
        }
    }

    /// The matching Arrow logical type
    pub fn data_type(&self) -> DataType {
        match self {
            ElementType::Int8 => DataType::Int8,
            ElementType::Int16 => DataType::Int16,
            ElementType::Int32 => DataType::Int32,
            ElementType::Int64 => DataType::Int64,
            ElementType::UInt8 => DataType::UInt8,
            ElementType::UInt16 => DataType::UInt16,
            ElementType::UInt32 => DataType::UInt32,
            ElementType::UInt64 => DataType::UInt64,
            ElementType::Float32 => DataType::Float32,
            ElementType::Float64 => DataType::Float64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_recognized_table() {
        assert_eq!(ElementType::resolve("Int", 8).unwrap(), ElementType::Int8);
        assert_eq!(ElementType::resolve("Int", 16).unwrap(), ElementType::Int16);
        assert_eq!(ElementType::resolve("Int", 32).unwrap(), ElementType::Int32);
        assert_eq!(ElementType::resolve("Int", 64).unwrap(), ElementType::Int64);
        assert_eq!(
            ElementType::resolve("FloatingPoint", 32).unwrap(),
            ElementType::Float32
        );
        assert_eq!(
            ElementType::resolve("FloatingPoint", 64).unwrap(),
            ElementType::Float64
        );
    }

    #[test]
    fn test_resolve_unsigned() {
        assert_eq!(
            ElementType::resolve_signed("Int", 16, false).unwrap(),
            ElementType::UInt16
        );
        // Signedness has no meaning for floats
        assert_eq!(
            ElementType::resolve_signed("FloatingPoint", 64, false).unwrap(),
            ElementType::Float64
        );
    }

    #[test]
    fn test_resolve_rejects_unknown_pairs() {
        for (kind, bitwidth) in [
            ("Decimal", 128),
            ("FloatingPoint", 16),
            ("Int", 128),
            ("Int", 0),
            ("int", 32),
            ("Bool", 1),
        ] {
            match ElementType::resolve(kind, bitwidth) {
                Err(GpuArrowError::UnsupportedType { kind: k, bitwidth: b }) => {
                    assert_eq!(k, kind);
                    assert_eq!(b, bitwidth);
                }
                other => panic!("expected UnsupportedType for {kind} {bitwidth}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_byte_width_matches_arrow() {
        for ty in [
            ElementType::Int8,
            ElementType::Int16,
            ElementType::Int32,
            ElementType::Int64,
            ElementType::UInt8,
            ElementType::UInt16,
            ElementType::UInt32,
            ElementType::UInt64,
            ElementType::Float32,
            ElementType::Float64,
        ] {
            assert_eq!(Some(ty.byte_width()), ty.data_type().primitive_width());
        }
    }
}
