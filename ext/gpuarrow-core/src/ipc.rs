//! In-process metadata parser for regions holding an Arrow IPC stream.
//!
//! The region is expected to start with a Schema message followed by a
//! RecordBatch message (optionally behind the `ARROW1` file magic). The
//! parser emits one metadata entry per top-level field and reports the start
//! of the record batch body as the data offset; buffer offsets in the
//! entries are relative to that body.
//!
//! Only layouts with exactly a validity buffer and a data buffer are
//! described. Variable-width and nested fields, dictionary encoding and
//! compressed bodies are reported as parse failures.

use arrow_ipc::{root_as_message, Field, Message, MessageHeader, Precision, Type};

use crate::metadata::{NodeEntry, TypeEntry};
use crate::parser::{CompletedSession, MetadataParser, ParserSession};
use crate::{BufferDescriptor, RegionHandle};

const CONTINUATION: [u8; 4] = [0xff; 4];
const FILE_MAGIC: &[u8; 6] = b"ARROW1";
/// File magic plus its padding
const FILE_MAGIC_PADDED_LEN: usize = 8;

type ParseResult<T> = std::result::Result<T, String>;

/// Parses the Arrow IPC stream at the start of a region
#[derive(Debug, Clone, Copy, Default)]
pub struct IpcStreamParser;

impl IpcStreamParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a stream into its JSON node list and data offset
    pub fn parse(bytes: &[u8]) -> ParseResult<(String, u64)> {
        let (entries, body_start) = parse_stream(bytes)?;
        let json = serde_json::to_string(&entries).map_err(|e| e.to_string())?;
        Ok((json, body_start as u64))
    }
}

impl MetadataParser for IpcStreamParser {
    fn open<'a>(&self, handle: RegionHandle<'a>) -> Box<dyn ParserSession + 'a> {
        Box::new(CompletedSession::new(Self::parse(handle.as_bytes())))
    }
}

struct Frame<'a> {
    message: Message<'a>,
    /// First byte after the metadata, where the body starts
    body_start: usize,
}

fn read_frame(bytes: &[u8], pos: usize) -> ParseResult<Option<Frame<'_>>> {
    let prefix = pos
        .checked_add(4)
        .and_then(|end| bytes.get(pos..end))
        .ok_or_else(|| format!("truncated message prefix at byte {}", pos))?;

    let (meta_len, meta_start) = if prefix == CONTINUATION {
        let len_bytes = bytes
            .get(pos + 4..)
            .and_then(|rest| rest.get(..4))
            .ok_or_else(|| format!("truncated message length at byte {}", pos + 4))?;
        (read_i32(len_bytes), pos + 8)
    } else {
        // Legacy framing without the continuation marker
        (read_i32(prefix), pos + 4)
    };

    if meta_len == 0 {
        return Ok(None);
    }
    let meta_len = usize::try_from(meta_len)
        .map_err(|_| format!("negative message length {} at byte {}", meta_len, pos))?;

    let meta_end = meta_start
        .checked_add(meta_len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| format!("truncated message metadata at byte {}", meta_start))?;

    let message = root_as_message(&bytes[meta_start..meta_end])
        .map_err(|e| format!("invalid message at byte {}: {}", meta_start, e))?;

    Ok(Some(Frame {
        message,
        body_start: meta_end,
    }))
}

fn read_i32(bytes: &[u8]) -> i32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[..4]);
    i32::from_le_bytes(word)
}

fn header_name(message: &Message<'_>) -> &'static str {
    message.header_type().variant_name().unwrap_or("unknown")
}

fn parse_stream(bytes: &[u8]) -> ParseResult<(Vec<NodeEntry>, usize)> {
    let start = if bytes.starts_with(FILE_MAGIC) {
        FILE_MAGIC_PADDED_LEN
    } else {
        0
    };

    let schema_frame = read_frame(bytes, start)?
        .ok_or_else(|| "stream ended before a schema message".to_string())?;
    let schema = schema_frame.message.header_as_schema().ok_or_else(|| {
        format!(
            "expected a Schema message, found {}",
            header_name(&schema_frame.message)
        )
    })?;
    let schema_body = usize::try_from(schema_frame.message.bodyLength())
        .map_err(|_| "negative schema body length".to_string())?;

    let batch_pos = schema_frame
        .body_start
        .checked_add(schema_body)
        .ok_or_else(|| "schema body length overflows the region".to_string())?;
    let batch_frame = read_frame(bytes, batch_pos)?
        .ok_or_else(|| "stream ended before a record batch".to_string())?;
    let batch = match batch_frame.message.header_type() {
        MessageHeader::RecordBatch => batch_frame
            .message
            .header_as_record_batch()
            .ok_or_else(|| "record batch header missing".to_string())?,
        MessageHeader::DictionaryBatch => {
            return Err("dictionary batches are not supported".to_string())
        }
        _ => {
            return Err(format!(
                "expected a RecordBatch message, found {}",
                header_name(&batch_frame.message)
            ))
        }
    };

    if batch.compression().is_some() {
        return Err("compressed record batches are not supported".to_string());
    }

    let body_start = batch_frame.body_start;
    let body_len = usize::try_from(batch_frame.message.bodyLength())
        .map_err(|_| "negative record batch body length".to_string())?;
    if body_start.checked_add(body_len).map_or(true, |end| end > bytes.len()) {
        return Err(format!(
            "truncated record batch body: need {} bytes at byte {}, region has {}",
            body_len,
            body_start,
            bytes.len()
        ));
    }

    let fields: Vec<Field<'_>> = schema.fields().map(|f| f.iter().collect()).unwrap_or_default();
    let nodes = batch.nodes().ok_or_else(|| "record batch has no field nodes".to_string())?;
    let buffers = batch.buffers().ok_or_else(|| "record batch has no buffers".to_string())?;

    // Layout problems are reported per column before any count mismatch
    let dtypes = fields
        .iter()
        .map(|field| {
            let name = field.name().unwrap_or_default();
            if field.dictionary().is_some() {
                return Err(format!("dictionary encoded column '{}' is not supported", name));
            }
            type_entry(field).ok_or_else(|| {
                format!(
                    "unsupported layout for column '{}': {}",
                    name,
                    field.type_type().variant_name().unwrap_or("unknown")
                )
            })
        })
        .collect::<ParseResult<Vec<_>>>()?;

    if nodes.len() != fields.len() {
        return Err(format!(
            "record batch has {} field nodes for {} schema fields",
            nodes.len(),
            fields.len()
        ));
    }
    if buffers.len() != 2 * fields.len() {
        return Err(format!(
            "record batch has {} buffers for {} fixed-width fields",
            buffers.len(),
            fields.len()
        ));
    }

    let mut entries = Vec::with_capacity(fields.len());
    for (idx, (field, dtype)) in fields.iter().zip(dtypes).enumerate() {
        let name = field.name().unwrap_or_default().to_string();

        let node = nodes.get(idx);
        let validity = buffers.get(2 * idx);
        let data = buffers.get(2 * idx + 1);

        entries.push(NodeEntry {
            length: non_negative(node.length(), &name, "length")?,
            null_count: non_negative(node.null_count(), &name, "null_count")?,
            null_buffer: BufferDescriptor::new(
                non_negative(validity.offset(), &name, "null buffer offset")?,
                non_negative(validity.length(), &name, "null buffer length")?,
            ),
            data_buffer: BufferDescriptor::new(
                non_negative(data.offset(), &name, "data buffer offset")?,
                non_negative(data.length(), &name, "data buffer length")?,
            ),
            dtype,
            name,
        });
    }

    Ok((entries, body_start))
}

fn non_negative(value: i64, column: &str, what: &str) -> ParseResult<usize> {
    usize::try_from(value)
        .map_err(|_| format!("column '{}' has invalid {} {}", column, what, value))
}

/// Describe a fixed-width field type the way the metadata document names it
fn type_entry(field: &Field<'_>) -> Option<TypeEntry> {
    let entry = |name: &str, bitwidth: i32, is_signed: Option<bool>| {
        Some(TypeEntry {
            name: name.to_string(),
            bitwidth: u32::try_from(bitwidth).ok()?,
            is_signed,
        })
    };

    match field.type_type() {
        Type::Int => {
            let int = field.type_as_int()?;
            entry("Int", int.bitWidth(), Some(int.is_signed()))
        }
        Type::FloatingPoint => {
            let bits = match field.type_as_floating_point()?.precision() {
                Precision::HALF => 16,
                Precision::SINGLE => 32,
                Precision::DOUBLE => 64,
                _ => return None,
            };
            entry("FloatingPoint", bits, None)
        }
        Type::Bool => entry("Bool", 1, None),
        Type::Decimal => entry("Decimal", field.type_as_decimal()?.bitWidth(), None),
        Type::Date => {
            let bits = if field.type_as_date()?.unit() == arrow_ipc::DateUnit::DAY {
                32
            } else {
                64
            };
            entry("Date", bits, None)
        }
        Type::Time => entry("Time", field.type_as_time()?.bitWidth(), None),
        Type::Timestamp => entry("Timestamp", 64, None),
        Type::Duration => entry("Duration", 64, None),
        Type::FixedSizeBinary => entry(
            "FixedSizeBinary",
            field.type_as_fixed_size_binary()?.byteWidth().checked_mul(8)?,
            None,
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_region_fails() {
        let err = IpcStreamParser::parse(&[]).unwrap_err();
        assert!(err.contains("truncated message prefix"));
    }

    #[test]
    fn test_end_of_stream_before_schema() {
        let err = IpcStreamParser::parse(&[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(err, "stream ended before a schema message");

        // legacy framing end marker
        let err = IpcStreamParser::parse(&[0, 0, 0, 0]).unwrap_err();
        assert_eq!(err, "stream ended before a schema message");
    }

    #[test]
    fn test_truncated_metadata() {
        let mut bytes = vec![0xff, 0xff, 0xff, 0xff];
        bytes.extend_from_slice(&64i32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 16]);
        let err = IpcStreamParser::parse(&bytes).unwrap_err();
        assert!(err.contains("truncated message metadata"));
    }

    #[test]
    fn test_negative_length() {
        let mut bytes = vec![0xff, 0xff, 0xff, 0xff];
        bytes.extend_from_slice(&(-8i32).to_le_bytes());
        let err = IpcStreamParser::parse(&bytes).unwrap_err();
        assert!(err.contains("negative message length"));
    }

    #[test]
    fn test_garbage_metadata() {
        let mut bytes = vec![0xff, 0xff, 0xff, 0xff];
        bytes.extend_from_slice(&8i32.to_le_bytes());
        bytes.extend_from_slice(&[0xAB; 8]);
        let err = IpcStreamParser::parse(&bytes).unwrap_err();
        assert!(err.contains("invalid message"));
    }
}
