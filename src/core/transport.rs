//! Transport trait for log delivery destinations

use super::error::{LoggerError, Result};
use super::formatter::Formatter;
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use futures::future::{self, BoxFuture};
use std::fmt;
use std::sync::Arc;

/// Completion of one delivery; resolves once the sink has settled
pub type Delivery = BoxFuture<'static, Result<()>>;

/// Predicate deciding whether a transport handles an entry
pub type EntryFilter = Arc<dyn Fn(&LogEntry) -> bool + Send + Sync>;

/// A delivery that has already completed successfully
pub fn delivered() -> Delivery {
    Box::pin(future::ready(Ok(())))
}

/// A delivery that has already failed
pub fn rejected(error: LoggerError) -> Delivery {
    Box::pin(future::ready(Err(error)))
}

/// Destination for log entries
///
/// `write` must do its acceptance work (level gate, filter, enqueueing or
/// batching) before it returns, so the order in which a transport sees
/// entries is the order of `write` calls even when the returned futures are
/// awaited later or not at all. The future only reports completion.
///
/// # Example
///
/// ```
/// use chromalog::core::{delivered, Delivery, LogEntry, Transport};
/// use parking_lot::Mutex;
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Memory(Mutex<Vec<String>>);
///
/// impl Transport for Memory {
///     fn name(&self) -> &str {
///         "memory"
///     }
///
///     fn write(&self, entry: &Arc<LogEntry>) -> Delivery {
///         self.0.lock().push(entry.formatted_message.to_string());
///         delivered()
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    fn write(&self, entry: &Arc<LogEntry>) -> Delivery;

    /// Flush pending work; called once during graceful shutdown
    fn end(&self) -> Delivery {
        delivered()
    }
}

/// Gate, filter and custom rendering shared by the built-in transports
#[derive(Clone)]
pub struct TransportOptions {
    pub name: String,
    pub level: Option<LogLevel>,
    pub filter: Option<EntryFilter>,
    pub format: Option<Arc<dyn Formatter>>,
}

impl TransportOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
            filter: None,
            format: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Only handle entries at or above `level`
    #[must_use = "builder methods return a new value"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&LogEntry) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Replace the logger's precomputed display string with a custom rendering
    #[must_use = "builder methods return a new value"]
    pub fn with_format<F: Formatter + 'static>(mut self, format: F) -> Self {
        self.format = Some(Arc::new(format));
        self
    }

    /// Level gate and filter; rejections are silent
    pub fn accepts(&self, entry: &LogEntry) -> bool {
        if self.level.is_some_and(|min| entry.level < min) {
            return false;
        }
        match &self.filter {
            Some(filter) => filter(entry),
            None => true,
        }
    }

    /// Custom rendering if configured, otherwise `fallback`
    pub fn render(&self, entry: &LogEntry, fallback: impl FnOnce(&LogEntry) -> String) -> String {
        match &self.format {
            Some(format) => format.format(entry),
            None => fallback(entry),
        }
    }
}

impl fmt::Debug for TransportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportOptions")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("format", &self.format.as_ref().map(|_| "<formatter>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_level_gate() {
        let options = TransportOptions::new("test").with_level(LogLevel::Warn);

        assert!(!options.accepts(&LogEntry::new(LogLevel::Info, "info")));
        assert!(options.accepts(&LogEntry::new(LogLevel::Warn, "warn")));
        assert!(options.accepts(&LogEntry::new(LogLevel::Error, "error")));
    }

    #[test]
    fn test_accepts_filter() {
        let options = TransportOptions::new("test")
            .with_filter(|entry: &LogEntry| entry.formatted_message.contains("keep"));

        assert!(options.accepts(&LogEntry::new(LogLevel::Debug, "keep me")));
        assert!(!options.accepts(&LogEntry::new(LogLevel::Error, "drop me")));
    }

    #[test]
    fn test_render_prefers_custom_format() {
        let entry = LogEntry::new(LogLevel::Info, "body");
        let plain = TransportOptions::new("plain");
        let custom = TransportOptions::new("custom")
            .with_format(|entry: &LogEntry| format!("<{}>", entry.formatted_message));

        assert_eq!(plain.render(&entry, |e| e.formatted_message.to_string()), "body");
        assert_eq!(custom.render(&entry, |e| e.formatted_message.to_string()), "<body>");
    }

    #[tokio::test]
    async fn test_ready_deliveries() {
        assert!(delivered().await.is_ok());
        assert!(rejected(LoggerError::other("nope")).await.is_err());
    }
}
