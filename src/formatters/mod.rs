//! Formatter implementations

pub mod json;
pub mod pretty;
pub mod simple;

pub use json::JsonFormatter;
pub use pretty::PrettyFormatter;
pub use simple::SimpleFormatter;

pub use crate::core::Formatter;
use crate::core::TimeFormat;

/// Options shared by the built-in formatters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterOptions {
    /// Keep ANSI color sequences in the output
    pub colors: bool,
    /// Clock pattern for human-readable output; `None` means ISO 8601
    pub timestamp: Option<TimeFormat>,
    /// Pad level labels to a common width
    pub level_padding: bool,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            colors: true,
            timestamp: Some(TimeFormat::default()),
            level_padding: true,
        }
    }
}

impl FormatterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_timestamp(mut self, pattern: Option<TimeFormat>) -> Self {
        self.timestamp = pattern;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_level_padding(mut self, padding: bool) -> Self {
        self.level_padding = padding;
        self
    }
}
