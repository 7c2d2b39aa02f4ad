//! Structured formatter: one JSON object per line

use super::FormatterOptions;
use crate::core::{iso8601, strip_ansi, Formatter, LogEntry};
use serde_json::json;

/// Emits `{"timestamp","level","message","context","fileName"}`
///
/// `message` is the logger's display string; colors are stripped unless
/// explicitly enabled, since the output is meant for machines.
///
/// # Example
///
/// ```
/// use chromalog::formatters::JsonFormatter;
/// use chromalog::core::{Formatter, LogEntry, LogLevel};
///
/// let line = JsonFormatter::new().format(&LogEntry::new(LogLevel::Warn, "disk almost full"));
/// let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
/// assert_eq!(parsed["level"], "warn");
/// ```
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    options: FormatterOptions,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            options: FormatterOptions::new().with_colors(false),
        }
    }

    pub fn with_options(options: FormatterOptions) -> Self {
        Self { options }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let message = if self.options.colors {
            entry.formatted_message.to_string()
        } else {
            strip_ansi(&entry.formatted_message)
        };

        json!({
            "timestamp": iso8601(&entry.timestamp),
            "level": entry.level,
            "message": message,
            "context": entry.context,
            "fileName": entry.file_name,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogContext, LogLevel};
    use serde_json::Value;

    #[test]
    fn test_round_trip_parse() {
        let entry = LogEntry::new(LogLevel::Error, "boom")
            .with_context(LogContext::new().with_field("job", 7))
            .with_file_name("worker.rs:12")
            .with_formatted_message("\x1b[31mERROR\x1b[0m boom \"quoted\"\n");

        let line = JsonFormatter::new().format(&entry);
        let parsed: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["level"], "error");
        assert_eq!(parsed["message"], "ERROR boom \"quoted\"\n");
        assert_eq!(parsed["context"]["job"], 7);
        assert_eq!(parsed["fileName"], "worker.rs:12");
        assert!(parsed["timestamp"].as_str().unwrap().contains('T'));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_keeps_colors_when_enabled() {
        let entry = LogEntry::new(LogLevel::Info, "x").with_formatted_message("\x1b[36mx\x1b[0m");
        let formatter = JsonFormatter::with_options(FormatterOptions::new().with_colors(true));
        let parsed: Value = serde_json::from_str(&formatter.format(&entry)).unwrap();
        assert_eq!(parsed["message"], "\x1b[36mx\x1b[0m");
    }
}
