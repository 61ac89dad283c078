//! Zero-copy column reader for Arrow data shared through a memory region
//!
//! `gpuarrow-core` reads columnar data that another process (or device)
//! placed in a shared memory region. A metadata parser describes where each
//! column's buffers live; this crate turns that description into typed views
//! over the region without copying a single data byte.
//!
//! # Key Components
//!
//! - **Metadata**: the parser's JSON node list and the descriptors resolved from it
//!   - [`BufferDescriptor`] locates one buffer inside the data region
//!   - [`NodeDescriptor`] describes one column
//!   - [`ElementType::resolve`] maps `(kind, bit-width)` pairs to element types
//!
//! - **Region**: [`SharedRegion`] wraps the externally owned bytes
//!   - Slicing shares memory; out-of-range slices fail with `SizeMismatch`
//!   - [`region::view_as`] is the only way bytes become typed values
//!
//! - **Columns**: [`ColumnView`] exposes raw, typed and validity views
//!   - Padding beyond the logical length is truncated
//!   - [`ColumnView::to_array`] realizes an Arrow array over the same memory
//!
//! - **Reader**: [`RegionReader`] runs the parser once and serves columns
//!   - Positional access through [`traits::ColumnCollection`]
//!   - Name-keyed, ordered realization through [`RegionReader::to_mapping`]
//!
//! - **Parsers**: the [`MetadataParser`] seam
//!   - Any `Fn(RegionHandle) -> Result<(String, u64), String>` is a parser
//!   - [`IpcStreamParser`] reads regions holding an Arrow IPC stream
//!
//! # Example Usage
//!
//! ```
//! use arrow_array::Array;
//! use gpuarrow_core::{ColumnCollection, IpcStreamParser, RegionReader, SharedRegion};
//! # fn region() -> SharedRegion {
//! #     use arrow_array::{ArrayRef, Int32Array, RecordBatch};
//! #     use std::sync::Arc;
//! #     let batch = RecordBatch::try_from_iter([(
//! #         "x",
//! #         Arc::new(Int32Array::from(vec![1, 2, 3])) as ArrayRef,
//! #     )])
//! #     .unwrap();
//! #     let mut bytes = Vec::new();
//! #     let mut writer =
//! #         arrow_ipc::writer::StreamWriter::try_new(&mut bytes, &batch.schema()).unwrap();
//! #     writer.write(&batch).unwrap();
//! #     writer.finish().unwrap();
//! #     drop(writer);
//! #     let mut buffer = arrow_buffer::MutableBuffer::new(bytes.len());
//! #     buffer.extend_from_slice(&bytes);
//! #     SharedRegion::new(buffer.into())
//! # }
//!
//! let reader = RegionReader::new(region(), &IpcStreamParser::new())?;
//! assert_eq!(reader.count(), 1);
//!
//! let columns = reader.to_mapping()?;
//! assert_eq!(columns["x"].len(), 3);
//! # Ok::<(), gpuarrow_core::GpuArrowError>(())
//! ```

pub mod column;
pub mod error;
pub mod ipc;
pub mod logger;
pub mod metadata;
pub mod parser;
pub mod reader;
pub mod region;
pub mod schema;
pub mod traits;
pub mod value;

#[cfg(test)]
pub mod test_utils;

pub use column::{ColumnView, MaskUnit, MASK_UNIT_SIZE};
pub use error::{GpuArrowError, Result};
pub use ipc::IpcStreamParser;
pub use logger::{LogLevel, LogSink, Logger};
pub use metadata::{BufferDescriptor, NodeDescriptor, NodeEntry, TypeEntry};
pub use parser::{CompletedSession, MetadataParser, ParserSession};
pub use reader::{DuplicateNamePolicy, ReaderOptions, RegionReader, RegionReaderBuilder};
pub use region::{RegionHandle, SharedRegion};
pub use schema::ElementType;
pub use traits::ColumnCollection;
pub use value::ColumnData;
