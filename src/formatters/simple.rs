//! Plain formatter: the logger's display string, as is

use super::FormatterOptions;
use crate::core::{strip_ansi, Formatter, LogEntry};

/// Returns `formatted_message` verbatim, optionally without colors
#[derive(Debug, Clone, Default)]
pub struct SimpleFormatter {
    options: FormatterOptions,
}

impl SimpleFormatter {
    pub fn new(options: FormatterOptions) -> Self {
        Self { options }
    }
}

impl Formatter for SimpleFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        if self.options.colors {
            entry.formatted_message.to_string()
        } else {
            strip_ansi(&entry.formatted_message)
        }
    }
}
