//! Log entry structure

use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::log_message::LogMessage;
use super::time_format::iso8601;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One log event, built once per `log` call and shared by every transport
///
/// `formatted_message` is rendered by the logger before dispatch; transports
/// read it but never rebuild it.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: LogMessage,
    pub context: LogContext,
    pub file_name: String,
    pub formatted_message: Arc<str>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<LogMessage>) -> Self {
        let message = message.into();
        let formatted_message: Arc<str> = Arc::from(message.render(None));
        Self {
            timestamp: Utc::now(),
            level,
            message,
            context: LogContext::new(),
            file_name: String::new(),
            formatted_message,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub fn with_formatted_message(mut self, formatted: impl Into<Arc<str>>) -> Self {
        self.formatted_message = formatted.into();
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl Serialize for LogEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LogEntry", 6)?;
        state.serialize_field("timestamp", &iso8601(&self.timestamp))?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("context", &self.context)?;
        state.serialize_field("fileName", &self.file_name)?;
        state.serialize_field("formattedMessage", &*self.formatted_message)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry_renders_payload_once() {
        let entry = LogEntry::new(LogLevel::Info, "hello");
        assert_eq!(&*entry.formatted_message, "hello");
        assert!(entry.context.is_empty());
        assert!(entry.file_name.is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let entry = LogEntry::new(LogLevel::Warn, json!({"disk": "full"}))
            .with_context(LogContext::new().with_field("host", "db1"))
            .with_file_name("main.rs:10")
            .with_formatted_message("WARN disk full");

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["level"], "warn");
        assert_eq!(value["message"], json!({"disk": "full"}));
        assert_eq!(value["context"], json!({"host": "db1"}));
        assert_eq!(value["fileName"], "main.rs:10");
        assert_eq!(value["formattedMessage"], "WARN disk full");
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
