//! Formatter trait for rendering entries into display strings

use super::log_entry::LogEntry;

/// Pure rendering strategy: one entry in, one display string out
///
/// Formatting never fails; values that cannot be rendered fall back to
/// their plain string form. Any `Fn(&LogEntry) -> String` is a formatter.
///
/// # Example
///
/// ```
/// use chromalog::core::{Formatter, LogEntry, LogLevel};
///
/// let shout = |entry: &LogEntry| entry.formatted_message.to_uppercase();
/// let entry = LogEntry::new(LogLevel::Info, "quiet");
/// assert_eq!(shout.format(&entry), "QUIET");
/// ```
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &LogEntry) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&LogEntry) -> String + Send + Sync,
{
    fn format(&self, entry: &LogEntry) -> String {
        self(entry)
    }
}
