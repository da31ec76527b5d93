//! Logger port and built-in sinks.
//!
//! # Design
//! The pipeline filters messages against the configured minimum level
//! before they reach a sink, so sinks only ever see what should be written.
//! Message bodies are built lazily and cost nothing when filtered out.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a log message, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
        };
        f.write_str(label)
    }
}

/// Sink for pipeline log messages.
pub trait NetworkLogger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards messages to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl NetworkLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "micro_client", "{message}"),
            LogLevel::Info => tracing::info!(target: "micro_client", "{message}"),
            LogLevel::Warning => tracing::warn!(target: "micro_client", "{message}"),
            LogLevel::Error => tracing::error!(target: "micro_client", "{message}"),
        }
    }
}

/// Prints `[Level] - message` lines to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutLogger;

impl StdoutLogger {
    pub(crate) fn format(level: LogLevel, message: &str) -> String {
        format!("[{level}] - {message}")
    }
}

impl NetworkLogger for StdoutLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("{}", Self::format(level, message));
    }
}

/// Level-filtering front for an optional logger.
#[derive(Clone, Copy)]
pub(crate) struct LogSink<'a> {
    logger: Option<&'a dyn NetworkLogger>,
    minimum: LogLevel,
}

impl<'a> LogSink<'a> {
    pub(crate) fn new(logger: Option<&'a dyn NetworkLogger>, minimum: LogLevel) -> Self {
        Self { logger, minimum }
    }

    pub(crate) fn log(&self, level: LogLevel, message: impl FnOnce() -> String) {
        if level < self.minimum {
            return;
        }
        if let Some(logger) = self.logger {
            logger.log(level, &message());
        }
    }

    pub(crate) fn debug(&self, message: impl FnOnce() -> String) {
        self.log(LogLevel::Debug, message);
    }

    pub(crate) fn info(&self, message: impl FnOnce() -> String) {
        self.log(LogLevel::Info, message);
    }

    pub(crate) fn warning(&self, message: impl FnOnce() -> String) {
        self.log(LogLevel::Warning, message);
    }

    pub(crate) fn error(&self, message: impl FnOnce() -> String) {
        self.log(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        messages: Mutex<Vec<(LogLevel, String)>>,
    }

    impl NetworkLogger for Recorder {
        fn log(&self, level: LogLevel, message: &str) {
            self.messages.lock().unwrap().push((level, message.to_string()));
        }
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn level_labels() {
        assert_eq!(LogLevel::Warning.to_string(), "Warning");
        assert_eq!(StdoutLogger::format(LogLevel::Info, "Request: GET /"), "[Info] - Request: GET /");
    }

    #[test]
    fn level_deserializes_lowercase() {
        let level: LogLevel = serde_json::from_str(r#""warning""#).unwrap();
        assert_eq!(level, LogLevel::Warning);
    }

    #[test]
    fn sink_drops_messages_below_minimum() {
        let recorder = Recorder::default();
        let sink = LogSink::new(Some(&recorder), LogLevel::Warning);

        sink.debug(|| "hidden".to_string());
        sink.info(|| "hidden".to_string());
        sink.warning(|| "shown".to_string());
        sink.error(|| "shown".to_string());

        let messages = recorder.messages.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|(_, message)| message == "shown"));
    }

    #[test]
    fn filtered_messages_are_never_built() {
        let recorder = Recorder::default();
        let sink = LogSink::new(Some(&recorder), LogLevel::Error);
        sink.debug(|| panic!("message should not be formatted"));
        assert!(recorder.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn sink_without_logger_is_silent() {
        let sink = LogSink::new(None, LogLevel::Debug);
        sink.error(|| "nobody listens".to_string());
    }
}
