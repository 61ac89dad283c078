//! Test utilities for gpuarrow-core

#[cfg(test)]
pub mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use arrow_buffer::MutableBuffer;

    use crate::parser::{CompletedSession, MetadataParser, ParserSession};
    use crate::{
        BufferDescriptor, ElementType, LogLevel, LogSink, Logger, NodeDescriptor, RegionHandle,
        SharedRegion,
    };

    /// Copy `bytes` into a 64-byte aligned region
    pub fn aligned_region(bytes: &[u8]) -> SharedRegion {
        let mut buffer = MutableBuffer::new(bytes.len());
        buffer.extend_from_slice(bytes);
        SharedRegion::new(buffer.into())
    }

    pub fn node(
        name: &str,
        length: usize,
        null_count: usize,
        null_buffer: (usize, usize),
        data_buffer: (usize, usize),
        dtype: ElementType,
    ) -> NodeDescriptor {
        NodeDescriptor {
            name: name.to_string(),
            length,
            null_count,
            null_buffer: BufferDescriptor::new(null_buffer.0, null_buffer.1),
            data_buffer: BufferDescriptor::new(data_buffer.0, data_buffer.1),
            dtype,
        }
    }

    /// One metadata entry as the parser would emit it
    pub fn entry_json(
        name: &str,
        length: usize,
        null_count: usize,
        null_buffer: (usize, usize),
        data_buffer: (usize, usize),
        kind: &str,
        bitwidth: u32,
    ) -> String {
        format!(
            r#"{{"name": "{}", "length": {}, "null_count": {},
                "null_buffer": {{"offset": {}, "length": {}}},
                "data_buffer": {{"offset": {}, "length": {}}},
                "dtype": {{"name": "{}", "bitwidth": {}}}}}"#,
            name,
            length,
            null_count,
            null_buffer.0,
            null_buffer.1,
            data_buffer.0,
            data_buffer.1,
            kind,
            bitwidth
        )
    }

    /// Sink that keeps every record it receives
    #[derive(Default)]
    pub struct RecordingSink {
        records: Mutex<Vec<(LogLevel, String)>>,
    }

    impl RecordingSink {
        pub fn records(&self) -> Vec<(LogLevel, String)> {
            self.records.lock().unwrap().clone()
        }
    }

    impl LogSink for RecordingSink {
        fn log(&self, level: LogLevel, message: &str) {
            self.records.lock().unwrap().push((level, message.to_string()));
        }
    }

    /// A debug-level logger that records instead of printing
    pub fn quiet_logger() -> Logger {
        let sink: Arc<dyn LogSink> = Arc::new(RecordingSink::default());
        Logger::new(Some(sink), Some(LogLevel::Debug))
    }

    /// Parser with a canned outcome that counts session opens and closes
    pub struct CountingParser {
        outcome: Result<(String, u64), String>,
        opened: AtomicUsize,
        closed: Arc<AtomicUsize>,
    }

    impl CountingParser {
        pub fn succeeding(json: &str, data_offset: u64) -> Self {
            Self::with_outcome(Ok((json.to_string(), data_offset)))
        }

        pub fn failing(message: &str) -> Self {
            Self::with_outcome(Err(message.to_string()))
        }

        fn with_outcome(outcome: Result<(String, u64), String>) -> Self {
            Self {
                outcome,
                opened: AtomicUsize::new(0),
                closed: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn opened(&self) -> usize {
            self.opened.load(Ordering::SeqCst)
        }

        pub fn closed(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }
    }

    struct CountingSession {
        inner: CompletedSession,
        closed: Arc<AtomicUsize>,
    }

    impl ParserSession for CountingSession {
        fn error(&self) -> Option<String> {
            self.inner.error()
        }

        fn to_json(&self) -> String {
            self.inner.to_json()
        }

        fn data_offset(&self) -> u64 {
            self.inner.data_offset()
        }
    }

    impl Drop for CountingSession {
        fn drop(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl MetadataParser for CountingParser {
        fn open<'a>(&self, _handle: RegionHandle<'a>) -> Box<dyn ParserSession + 'a> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingSession {
                inner: CompletedSession::new(self.outcome.clone()),
                closed: self.closed.clone(),
            })
        }
    }
}
