//! Column metadata: the JSON node list emitted by a metadata parser and the
//! descriptors resolved from it.
//!
//! Assembly is a pure metadata transform. Nothing here reads region bytes, so
//! buffer bounds are only checked later, when a [`crate::ColumnView`] slices
//! the region.

use serde::{Deserialize, Serialize};

use crate::{ElementType, GpuArrowError, Result};

/// Location of one buffer inside the shared data region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BufferDescriptor {
    pub offset: usize,
    pub length: usize,
}

impl BufferDescriptor {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// One past the last byte, or `None` if the addition overflows
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.length)
    }
}

/// Type object of a metadata entry, e.g. `{"name": "Int", "bitwidth": 32}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    pub bitwidth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_signed: Option<bool>,
}

/// One column object of the metadata document, as emitted by a parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub name: String,
    pub length: usize,
    pub null_count: usize,
    pub null_buffer: BufferDescriptor,
    pub data_buffer: BufferDescriptor,
    pub dtype: TypeEntry,
}

/// Fully resolved description of one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub name: String,
    /// Logical element count
    pub length: usize,
    pub null_count: usize,
    pub null_buffer: BufferDescriptor,
    pub data_buffer: BufferDescriptor,
    pub dtype: ElementType,
}

impl NodeDescriptor {
    /// Resolve a metadata entry into a descriptor
    pub fn from_entry(entry: NodeEntry) -> Result<Self> {
        if entry.null_count > entry.length {
            return Err(GpuArrowError::metadata_parsing(format!(
                "column '{}' has null_count {} greater than length {}",
                entry.name, entry.null_count, entry.length
            )));
        }

        let dtype = ElementType::resolve_signed(
            &entry.dtype.name,
            entry.dtype.bitwidth,
            entry.dtype.is_signed.unwrap_or(true),
        )?;

        Ok(Self {
            name: entry.name,
            length: entry.length,
            null_count: entry.null_count,
            null_buffer: entry.null_buffer,
            data_buffer: entry.data_buffer,
            dtype,
        })
    }

    /// Byte length of the logical data, without trailing padding
    pub fn data_byte_len(&self) -> Option<usize> {
        self.length.checked_mul(self.dtype.byte_width())
    }

    pub fn has_nulls(&self) -> bool {
        self.null_count > 0
    }
}

/// Decode the parser's JSON document into metadata entries, order preserved
pub fn parse_entries(json: &str) -> Result<Vec<NodeEntry>> {
    Ok(serde_json::from_str(json)?)
}

/// Decode the parser's JSON document straight into descriptors
pub fn parse_descriptors(json: &str) -> Result<Vec<NodeDescriptor>> {
    parse_entries(json)?
        .into_iter()
        .map(NodeDescriptor::from_entry)
        .collect()
}
