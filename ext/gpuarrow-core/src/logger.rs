// Logger module for region readers
// Wraps an injected log sink; falls back to stderr when none is given

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::GpuArrowError;

/// Environment variable consulted for the default level
pub const LOG_LEVEL_ENV: &str = "GPUARROW_LOG_LEVEL";

/// Severity levels, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = GpuArrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => {
                return Err(GpuArrowError::invalid_argument(format!(
                    "Invalid log level: {}",
                    s
                )))
            }
        })
    }
}

impl LogLevel {
    /// Level from the environment, `Warn` when unset or unparsable
    pub fn from_env() -> Self {
        std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogLevel::Warn)
    }
}

/// Destination for log records
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// A level-filtered handle around an optional sink
#[derive(Clone)]
pub struct Logger {
    sink: Option<Arc<dyn LogSink>>,
    level: LogLevel,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("sink", &self.sink.as_ref().map(|_| "<dyn LogSink>"))
            .field("level", &self.level)
            .finish()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl Logger {
    /// Create a logger; `level` defaults to the environment setting
    pub fn new(sink: Option<Arc<dyn LogSink>>, level: Option<LogLevel>) -> Self {
        Self {
            sink,
            level: level.unwrap_or_else(LogLevel::from_env),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Log a message at the given level
    pub fn log(&self, level: LogLevel, message: &str) {
        match &self.sink {
            Some(sink) => sink.log(level, message),
            None => eprintln!("{}", message),
        }
    }

    fn log_with<F, S>(&self, level: LogLevel, message_fn: F)
    where
        F: FnOnce() -> S,
        S: AsRef<str>,
    {
        if self.level <= level {
            let message = message_fn();
            self.log(level, message.as_ref());
        }
    }

    /// Log a debug message
    pub fn debug<F, S>(&self, message_fn: F)
    where
        F: FnOnce() -> S,
        S: AsRef<str>,
    {
        self.log_with(LogLevel::Debug, message_fn)
    }

    /// Log an info message
    pub fn info<F, S>(&self, message_fn: F)
    where
        F: FnOnce() -> S,
        S: AsRef<str>,
    {
        self.log_with(LogLevel::Info, message_fn)
    }

    /// Log a warning message
    pub fn warn<F, S>(&self, message_fn: F)
    where
        F: FnOnce() -> S,
        S: AsRef<str>,
    {
        self.log_with(LogLevel::Warn, message_fn)
    }

    /// Log an error message
    pub fn error<F, S>(&self, message_fn: F)
    where
        F: FnOnce() -> S,
        S: AsRef<str>,
    {
        self.log_with(LogLevel::Error, message_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test::RecordingSink;

    #[test]
    fn test_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("fatal".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_filtering() {
        let sink = Arc::new(RecordingSink::default());
        let logger = Logger::new(Some(sink.clone() as Arc<dyn LogSink>), Some(LogLevel::Info));

        logger.debug(|| "hidden");
        logger.info(|| "shown");
        logger.error(|| format!("failed: {}", 3));

        assert_eq!(
            sink.records(),
            vec![
                (LogLevel::Info, "shown".to_string()),
                (LogLevel::Error, "failed: 3".to_string()),
            ]
        );
    }

    #[test]
    fn test_filtered_messages_are_not_built() {
        let sink: Arc<dyn LogSink> = Arc::new(RecordingSink::default());
        let logger = Logger::new(Some(sink), Some(LogLevel::Error));
        let mut built = false;
        logger.warn(|| {
            built = true;
            "never"
        });
        assert!(!built);
    }
}
