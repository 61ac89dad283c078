use std::sync::Arc;

use arrow_array::types::{
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
use arrow_array::{ArrayRef, PrimitiveArray};
use arrow_buffer::{Buffer, NullBuffer, ScalarBuffer};

use crate::region::view_as;
use crate::{ElementType, Result};

/// Typed, zero-copy view of a column's data buffer
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    // Integer types
    Int8(ScalarBuffer<i8>),
    Int16(ScalarBuffer<i16>),
    Int32(ScalarBuffer<i32>),
    Int64(ScalarBuffer<i64>),
    UInt8(ScalarBuffer<u8>),
    UInt16(ScalarBuffer<u16>),
    UInt32(ScalarBuffer<u32>),
    UInt64(ScalarBuffer<u64>),

    // Floating point types
    Float32(ScalarBuffer<f32>),
    Float64(ScalarBuffer<f64>),
}

impl ColumnData {
    /// Reinterpret `bytes` as elements of `dtype` through the checked view constructor
    pub fn view(bytes: Buffer, dtype: ElementType) -> Result<Self> {
        let data = match dtype {
            ElementType::Int8 => ColumnData::Int8(view_as(bytes)?),
            ElementType::Int16 => ColumnData::Int16(view_as(bytes)?),
            ElementType::Int32 => ColumnData::Int32(view_as(bytes)?),
            ElementType::Int64 => ColumnData::Int64(view_as(bytes)?),
            ElementType::UInt8 => ColumnData::UInt8(view_as(bytes)?),
            ElementType::UInt16 => ColumnData::UInt16(view_as(bytes)?),
            ElementType::UInt32 => ColumnData::UInt32(view_as(bytes)?),
            ElementType::UInt64 => ColumnData::UInt64(view_as(bytes)?),
            ElementType::Float32 => ColumnData::Float32(view_as(bytes)?),
            ElementType::Float64 => ColumnData::Float64(view_as(bytes)?),
        };
        Ok(data)
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ColumnData::Int8(_) => ElementType::Int8,
            ColumnData::Int16(_) => ElementType::Int16,
            ColumnData::Int32(_) => ElementType::Int32,
            ColumnData::Int64(_) => ElementType::Int64,
            ColumnData::UInt8(_) => ElementType::UInt8,
            ColumnData::UInt16(_) => ElementType::UInt16,
            ColumnData::UInt32(_) => ElementType::UInt32,
            ColumnData::UInt64(_) => ElementType::UInt64,
            ColumnData::Float32(_) => ElementType::Float32,
            ColumnData::Float64(_) => ElementType::Float64,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int8(b) => b.len(),
            ColumnData::Int16(b) => b.len(),
            ColumnData::Int32(b) => b.len(),
            ColumnData::Int64(b) => b.len(),
            ColumnData::UInt8(b) => b.len(),
            ColumnData::UInt16(b) => b.len(),
            ColumnData::UInt32(b) => b.len(),
            ColumnData::UInt64(b) => b.len(),
            ColumnData::Float32(b) => b.len(),
            ColumnData::Float64(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The underlying bytes, still pointing into the shared region
    pub fn inner(&self) -> &Buffer {
        match self {
            ColumnData::Int8(b) => b.inner(),
            ColumnData::Int16(b) => b.inner(),
            ColumnData::Int32(b) => b.inner(),
            ColumnData::Int64(b) => b.inner(),
            ColumnData::UInt8(b) => b.inner(),
            ColumnData::UInt16(b) => b.inner(),
            ColumnData::UInt32(b) => b.inner(),
            ColumnData::UInt64(b) => b.inner(),
            ColumnData::Float32(b) => b.inner(),
            ColumnData::Float64(b) => b.inner(),
        }
    }

    pub fn byte_len(&self) -> usize {
        self.inner().len()
    }

    /// Build an Arrow array over the same memory, with an optional validity bitmap
    pub fn into_array(self, nulls: Option<NullBuffer>) -> Result<ArrayRef> {
        let array: ArrayRef = match self {
            ColumnData::Int8(b) => Arc::new(PrimitiveArray::<Int8Type>::try_new(b, nulls)?),
            ColumnData::Int16(b) => Arc::new(PrimitiveArray::<Int16Type>::try_new(b, nulls)?),
            ColumnData::Int32(b) => Arc::new(PrimitiveArray::<Int32Type>::try_new(b, nulls)?),
            ColumnData::Int64(b) => Arc::new(PrimitiveArray::<Int64Type>::try_new(b, nulls)?),
            ColumnData::UInt8(b) => Arc::new(PrimitiveArray::<UInt8Type>::try_new(b, nulls)?),
            ColumnData::UInt16(b) => Arc::new(PrimitiveArray::<UInt16Type>::try_new(b, nulls)?),
            ColumnData::UInt32(b) => Arc::new(PrimitiveArray::<UInt32Type>::try_new(b, nulls)?),
            ColumnData::UInt64(b) => Arc::new(PrimitiveArray::<UInt64Type>::try_new(b, nulls)?),
            ColumnData::Float32(b) => Arc::new(PrimitiveArray::<Float32Type>::try_new(b, nulls)?),
            ColumnData::Float64(b) => Arc::new(PrimitiveArray::<Float64Type>::try_new(b, nulls)?),
        };
        Ok(array)
    }
}
