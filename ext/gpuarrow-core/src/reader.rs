//! Reader over a shared region: one metadata parse, then read-only column access.

use std::collections::HashSet;
use std::sync::Arc;

use arrow_array::{ArrayRef, RecordBatch, RecordBatchOptions};
use arrow_schema::{Field, Schema};
use indexmap::IndexMap;

use crate::metadata::parse_entries;
use crate::parser::run_parser;
use crate::traits::ColumnCollection;
use crate::{
    ColumnView, GpuArrowError, LogLevel, LogSink, Logger, MetadataParser, NodeDescriptor, Result,
    SharedRegion,
};

/// What to do when two metadata entries share a column name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateNamePolicy {
    /// Fail construction with [`GpuArrowError::DuplicateColumn`]
    #[default]
    Reject,
    /// Keep every column positionally; by name, the last entry wins
    LastWins,
}

/// Options applied while constructing a [`RegionReader`]
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    pub logger: Logger,
    pub duplicate_names: DuplicateNamePolicy,
}

/// Builder for readers with non-default options
#[derive(Default)]
pub struct RegionReaderBuilder {
    sink: Option<Arc<dyn LogSink>>,
    level: Option<LogLevel>,
    duplicate_names: DuplicateNamePolicy,
}

impl RegionReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send log records to `sink` instead of stderr
    pub fn with_logger(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Override the level taken from `GPUARROW_LOG_LEVEL`
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_duplicate_names(mut self, policy: DuplicateNamePolicy) -> Self {
        self.duplicate_names = policy;
        self
    }

    pub fn options(self) -> ReaderOptions {
        ReaderOptions {
            logger: Logger::new(self.sink, self.level),
            duplicate_names: self.duplicate_names,
        }
    }

    pub fn build<P>(self, region: SharedRegion, parser: &P) -> Result<RegionReader>
    where
        P: MetadataParser + ?Sized,
    {
        RegionReader::with_options(region, parser, self.options())
    }
}

/// Columns of a shared region, decoded from the region's metadata
#[derive(Debug, Clone)]
pub struct RegionReader {
    region: SharedRegion,
    data: SharedRegion,
    nodes: Vec<NodeDescriptor>,
    logger: Logger,
}

impl RegionReader {
    /// Parse `region` with default options
    pub fn new<P>(region: SharedRegion, parser: &P) -> Result<Self>
    where
        P: MetadataParser + ?Sized,
    {
        Self::with_options(region, parser, ReaderOptions::default())
    }

    pub fn builder() -> RegionReaderBuilder {
        RegionReaderBuilder::new()
    }

    /// Parse `region` once and resolve every column descriptor.
    ///
    /// The parser session is closed before this returns, on success and on
    /// failure alike.
    pub fn with_options<P>(region: SharedRegion, parser: &P, options: ReaderOptions) -> Result<Self>
    where
        P: MetadataParser + ?Sized,
    {
        let ReaderOptions {
            logger,
            duplicate_names,
        } = options;

        let (json, data_offset) = run_parser(parser, region.handle(), &logger)?;

        let data_offset = usize::try_from(data_offset)
            .map_err(|_| GpuArrowError::size_mismatch(usize::MAX, region.len()))?;
        let data = region.slice_from(data_offset)?;
        logger.debug(|| format!("data region at offset {} ({} bytes)", data_offset, data.len()));

        let entries = parse_entries(&json)?;
        let mut nodes = Vec::with_capacity(entries.len());
        let mut seen = HashSet::with_capacity(entries.len());

        for entry in entries {
            logger.debug(|| format!("reading column '{}' from metadata", entry.name));
            let desc = NodeDescriptor::from_entry(entry)?;

            if !seen.insert(desc.name.clone()) {
                match duplicate_names {
                    DuplicateNamePolicy::Reject => {
                        return Err(GpuArrowError::DuplicateColumn(desc.name));
                    }
                    DuplicateNamePolicy::LastWins => {
                        logger.warn(|| {
                            format!("duplicate column '{}', last entry wins", desc.name)
                        });
                    }
                }
            }
            nodes.push(desc);
        }

        Ok(Self {
            region,
            data,
            nodes,
            logger,
        })
    }

    /// The whole region the reader was built from
    pub fn region(&self) -> &SharedRegion {
        &self.region
    }

    /// The data sub-region every column's buffers are relative to
    pub fn data_region(&self) -> &SharedRegion {
        &self.data
    }

    pub fn descriptors(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    /// Columns in metadata order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = ColumnView<'_>> + '_ {
        self.nodes
            .iter()
            .map(move |desc| ColumnView::new(&self.data, desc))
    }

    /// Realize every column, keyed by name, in metadata order.
    ///
    /// Columns with nulls carry their validity bitmap; columns without nulls
    /// carry none.
    pub fn to_mapping(&self) -> Result<IndexMap<String, ArrayRef>> {
        let mut mapping = IndexMap::with_capacity(self.nodes.len());
        for column in self.iter() {
            self.logger.debug(|| {
                format!(
                    "realizing column '{}' ({} x {}, {} nulls)",
                    column.name(),
                    column.len(),
                    column.dtype().type_name(),
                    column.null_count()
                )
            });
            mapping.insert(column.name().to_string(), column.to_array()?);
        }
        Ok(mapping)
    }

    /// Realize every column as one record batch, in metadata order
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let fields: Vec<Field> = self
            .nodes
            .iter()
            .map(|desc| Field::new(&desc.name, desc.dtype.data_type(), desc.has_nulls()))
            .collect();
        let columns = self
            .iter()
            .map(|column| column.to_array())
            .collect::<Result<Vec<_>>>()?;

        let schema = Arc::new(Schema::new(fields));
        let batch = if columns.is_empty() {
            RecordBatch::try_new_with_options(
                schema,
                columns,
                &RecordBatchOptions::new().with_row_count(Some(0)),
            )?
        } else {
            RecordBatch::try_new(schema, columns)?
        };
        Ok(batch)
    }
}

impl ColumnCollection for RegionReader {
    fn count(&self) -> usize {
        self.nodes.len()
    }

    fn get(&self, index: usize) -> Result<ColumnView<'_>> {
        self.nodes
            .get(index)
            .map(|desc| ColumnView::new(&self.data, desc))
            .ok_or(GpuArrowError::IndexOutOfRange {
                index,
                count: self.nodes.len(),
            })
    }

    fn column(&self, name: &str) -> Option<ColumnView<'_>> {
        self.nodes
            .iter()
            .rev()
            .find(|desc| desc.name == name)
            .map(|desc| ColumnView::new(&self.data, desc))
    }

    fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|desc| desc.name.as_str()).collect()
    }
}
