//! The metadata parser collaborator.
//!
//! A parser turns the raw bytes at the start of a region into a JSON list of
//! column entries plus the byte offset where column data begins. Parsers are
//! opened once per reader construction and closed when their session is
//! dropped, whether parsing succeeded or not.

use crate::{GpuArrowError, Logger, RegionHandle, Result};

/// An open parse of one region. Dropping the session closes it.
pub trait ParserSession {
    /// The failure message, if parsing failed
    fn error(&self) -> Option<String>;

    /// The column metadata as a JSON array
    fn to_json(&self) -> String;

    /// Offset of the data region, relative to the start of the handle
    fn data_offset(&self) -> u64;
}

/// Opens parser sessions over region handles
pub trait MetadataParser {
    fn open<'a>(&self, handle: RegionHandle<'a>) -> Box<dyn ParserSession + 'a>;
}

/// A session over an already computed parse outcome
#[derive(Debug, Clone)]
pub struct CompletedSession {
    outcome: std::result::Result<(String, u64), String>,
}

impl CompletedSession {
    pub fn new(outcome: std::result::Result<(String, u64), String>) -> Self {
        Self { outcome }
    }
}

impl ParserSession for CompletedSession {
    fn error(&self) -> Option<String> {
        self.outcome.as_ref().err().cloned()
    }

    fn to_json(&self) -> String {
        match &self.outcome {
            Ok((json, _)) => json.clone(),
            Err(_) => String::new(),
        }
    }

    fn data_offset(&self) -> u64 {
        match &self.outcome {
            Ok((_, offset)) => *offset,
            Err(_) => 0,
        }
    }
}

/// Plain functions `handle -> Result<(json, data_offset), message>` are parsers
impl<F> MetadataParser for F
where
    F: Fn(RegionHandle<'_>) -> std::result::Result<(String, u64), String>,
{
    fn open<'a>(&self, handle: RegionHandle<'a>) -> Box<dyn ParserSession + 'a> {
        Box::new(CompletedSession::new(self(handle)))
    }
}

/// Closes the wrapped session on drop, logging the close
struct SessionGuard<'a> {
    session: Box<dyn ParserSession + 'a>,
    logger: &'a Logger,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.logger.debug(|| "close metadata parser");
    }
}

/// Run one scoped parse: open, check for failure, fetch JSON and data offset, close.
pub(crate) fn run_parser<P>(
    parser: &P,
    handle: RegionHandle<'_>,
    logger: &Logger,
) -> Result<(String, u64)>
where
    P: MetadataParser + ?Sized,
{
    logger.debug(|| format!("open metadata parser at {:p}", handle.as_ptr()));
    let guard = SessionGuard {
        session: parser.open(handle),
        logger,
    };

    if let Some(error) = guard.session.error() {
        logger.error(|| format!("metadata parser failed: {}", error));
        return Err(GpuArrowError::MetadataParsing(error));
    }

    logger.debug(|| "metadata parser get metadata as json");
    let json = guard.session.to_json();

    logger.debug(|| "metadata parser data region offset");
    let offset = guard.session.data_offset();

    Ok((json, offset))
}
