//! Human-readable formatter with aligned level labels

use super::FormatterOptions;
use crate::core::{iso8601, strip_ansi, Formatter, LogEntry, LogLevel};
use chrono::Local;

/// `[timestamp] [LEVEL] [fileName] {context} message`
///
/// The file name and context parts are omitted when empty.
#[derive(Debug, Clone, Default)]
pub struct PrettyFormatter {
    options: FormatterOptions,
}

impl PrettyFormatter {
    pub fn new(options: FormatterOptions) -> Self {
        Self { options }
    }
}

impl Formatter for PrettyFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let message = if self.options.colors {
            entry.formatted_message.to_string()
        } else {
            strip_ansi(&entry.formatted_message)
        };

        let timestamp = match &self.options.timestamp {
            Some(pattern) => pattern.render(&entry.timestamp.with_timezone(&Local)),
            None => iso8601(&entry.timestamp),
        };

        let level = if self.options.level_padding {
            format!("{:<width$}", entry.level.label(), width = LogLevel::MAX_LABEL_WIDTH)
        } else {
            entry.level.label().to_string()
        };

        let mut line = format!("[{}] [{}]", timestamp, level);
        if !entry.file_name.is_empty() {
            line.push_str(" [");
            line.push_str(&entry.file_name);
            line.push(']');
        }
        if !entry.context.is_empty() {
            line.push(' ');
            line.push_str(&entry.context.to_inline_json());
        }
        line.push(' ');
        line.push_str(&message);
        line
    }
}
