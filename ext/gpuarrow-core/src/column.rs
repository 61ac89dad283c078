//! Per-column access to the shared data region.

use arrow_array::ArrayRef;
use arrow_buffer::{BooleanBuffer, Buffer, NullBuffer, ScalarBuffer};

use crate::region::view_as;
use crate::{
    BufferDescriptor, ColumnData, ElementType, GpuArrowError, NodeDescriptor, Result, SharedRegion,
};

/// Storage unit of the null mask words
pub type MaskUnit = u8;

/// Size in bytes of one null mask word
pub const MASK_UNIT_SIZE: usize = std::mem::size_of::<MaskUnit>();

/// A stateless view of one column over the shared data region.
///
/// Every accessor slices the region afresh; nothing is cached and nothing
/// is copied.
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a> {
    region: &'a SharedRegion,
    desc: &'a NodeDescriptor,
}

impl<'a> ColumnView<'a> {
    pub fn new(region: &'a SharedRegion, desc: &'a NodeDescriptor) -> Self {
        Self { region, desc }
    }

    pub fn name(&self) -> &'a str {
        &self.desc.name
    }

    /// Logical element count
    pub fn len(&self) -> usize {
        self.desc.length
    }

    pub fn is_empty(&self) -> bool {
        self.desc.length == 0
    }

    pub fn null_count(&self) -> usize {
        self.desc.null_count
    }

    pub fn dtype(&self) -> ElementType {
        self.desc.dtype
    }

    pub fn descriptor(&self) -> &'a NodeDescriptor {
        self.desc
    }

    /// The data buffer exactly as described, padding included
    pub fn data_raw(&self) -> Result<Buffer> {
        self.slice(&self.desc.data_buffer)
    }

    /// The null buffer exactly as described, padding included
    pub fn null_raw(&self) -> Result<Buffer> {
        self.slice(&self.desc.null_buffer)
    }

    /// The data as `len()` elements of `dtype()`, trailing padding dropped
    pub fn data(&self) -> Result<ColumnData> {
        let raw = self.data_raw()?;
        let end = self
            .desc
            .data_byte_len()
            .ok_or_else(|| GpuArrowError::size_mismatch(usize::MAX, raw.len()))?;
        let truncated = truncate(raw, end)?;
        ColumnData::view(truncated, self.desc.dtype)
    }

    /// The null mask as whole mask words, trailing padding dropped.
    ///
    /// Only present when the column has nulls. The view holds
    /// `len() / 8` words; bits of a final partial byte are not included.
    pub fn null(&self) -> Result<Option<ScalarBuffer<MaskUnit>>> {
        if !self.desc.has_nulls() {
            return Ok(None);
        }
        let raw = self.null_raw()?;
        let end = (self.desc.length / 8) * MASK_UNIT_SIZE;
        let truncated = truncate(raw, end)?;
        Ok(Some(view_as::<MaskUnit>(truncated)?))
    }

    /// One validity bit per element, LSB first, when the column has nulls.
    ///
    /// The bitmap's own null count must agree with the metadata.
    pub fn validity(&self) -> Result<Option<NullBuffer>> {
        if !self.desc.has_nulls() {
            return Ok(None);
        }
        let raw = self.null_raw()?;
        let truncated = truncate(raw, self.desc.length.div_ceil(8))?;
        let nulls = NullBuffer::new(BooleanBuffer::new(truncated, 0, self.desc.length));
        if nulls.null_count() != self.desc.null_count {
            return Err(GpuArrowError::data_validation(format!(
                "column '{}' declares {} nulls but its bitmap has {}",
                self.desc.name,
                self.desc.null_count,
                nulls.null_count()
            )));
        }
        Ok(Some(nulls))
    }

    /// Realize the column as an Arrow array sharing the region's memory
    pub fn to_array(&self) -> Result<ArrayRef> {
        let data = self.data()?;
        let nulls = self.validity()?;
        data.into_array(nulls)
    }

    fn slice(&self, desc: &BufferDescriptor) -> Result<Buffer> {
        let raw = self.region.slice(desc)?;
        if raw.len() != desc.length {
            return Err(GpuArrowError::size_mismatch(desc.length, raw.len()));
        }
        Ok(raw)
    }
}

fn truncate(raw: Buffer, end: usize) -> Result<Buffer> {
    if end > raw.len() {
        return Err(GpuArrowError::size_mismatch(end, raw.len()));
    }
    Ok(raw.slice_with_length(0, end))
}
