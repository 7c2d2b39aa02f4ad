//! Log payloads and error expansion
//!
//! A payload is whatever the caller handed to `log`: plain text, a structured
//! JSON value, or an error. Errors are expanded into an [`ErrorRecord`] that
//! mirrors the `source()` chain and can be trimmed by [`ErrorFormat`].

use super::color::{colorize, strip_ansi, Color};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;

/// Which optional parts of an expanded error are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorFormat {
    pub include_stack: bool,
    pub include_cause: bool,
    pub include_metadata: bool,
}

impl Default for ErrorFormat {
    fn default() -> Self {
        Self {
            include_stack: true,
            include_cause: true,
            include_metadata: true,
        }
    }
}

/// Structured view of an error and its cause chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ErrorRecord>>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ErrorRecord {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            cause: None,
            metadata: Map::new(),
        }
    }

    /// Expand a Rust error, walking its `source()` chain
    ///
    /// The outermost error is named after its concrete type. A stack is
    /// attached when backtraces are enabled for the process
    /// (`RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`).
    pub fn from_error<E: StdError + ?Sized>(error: &E) -> Self {
        let mut record = Self::new(short_type_name::<E>(), error.to_string());
        record.cause = error.source().map(|source| Box::new(Self::from_source(source)));

        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            record.stack = Some(trim_own_frame(&backtrace.to_string()));
        }
        record
    }

    fn from_source(error: &(dyn StdError + 'static)) -> Self {
        let mut record = Self::new("Error", error.to_string());
        record.cause = error.source().map(|source| Box::new(Self::from_source(source)));
        record
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: ErrorRecord) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Drop the parts disabled by `format`, recursively through the cause chain
    #[must_use]
    pub fn apply_format(mut self, format: &ErrorFormat) -> Self {
        if !format.include_stack {
            self.stack = None;
        }
        if !format.include_metadata {
            self.metadata.clear();
        }
        self.cause = if format.include_cause {
            self.cause.map(|cause| Box::new(cause.apply_format(format)))
        } else {
            None
        };
        self
    }

    /// Number of records in the chain, including this one
    pub fn depth(&self) -> usize {
        1 + self.cause.as_ref().map_or(0, |cause| cause.depth())
    }
}

fn short_type_name<E: ?Sized>() -> String {
    let full = std::any::type_name::<E>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .to_string()
}

/// Drop the first frame (the capture site) and trim indentation
fn trim_own_frame(stack: &str) -> String {
    let lines: Vec<&str> = stack.lines().map(str::trim).collect();
    let second_frame = lines
        .iter()
        .position(|line| line.starts_with("1:"))
        .unwrap_or(0);
    lines[second_frame..].join("\n")
}

/// What was logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogMessage {
    Text(String),
    Error(ErrorRecord),
    Json(Value),
}

impl LogMessage {
    /// Build an error payload from any Rust error
    pub fn error<E: StdError + ?Sized>(error: &E) -> Self {
        LogMessage::Error(ErrorRecord::from_error(error))
    }

    /// Build a structured payload from any serializable value
    ///
    /// Values that fail to serialize fall back to their debug rendering.
    pub fn json<T: Serialize + std::fmt::Debug>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => LogMessage::Json(value),
            Err(_) => LogMessage::Text(format!("{:?}", value)),
        }
    }

    /// Apply the error toggles; non-error payloads are returned unchanged
    #[must_use]
    pub fn expand(self, format: &ErrorFormat) -> Self {
        match self {
            LogMessage::Error(record) => LogMessage::Error(record.apply_format(format)),
            other => other,
        }
    }

    /// Display string, optionally wrapped in a color override
    pub fn render(&self, color: Option<Color>) -> String {
        let rendered = match self {
            LogMessage::Text(text) => text.clone(),
            LogMessage::Json(Value::String(text)) => text.clone(),
            LogMessage::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            LogMessage::Error(record) => strip_ansi(
                &serde_json::to_string_pretty(record).unwrap_or_else(|_| record.message.clone()),
            ),
        };
        match color {
            Some(color) => colorize(&rendered, color),
            None => rendered,
        }
    }
}

impl From<&str> for LogMessage {
    fn from(text: &str) -> Self {
        LogMessage::Text(text.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(text: String) -> Self {
        LogMessage::Text(text)
    }
}

impl From<&String> for LogMessage {
    fn from(text: &String) -> Self {
        LogMessage::Text(text.clone())
    }
}

impl From<Value> for LogMessage {
    fn from(value: Value) -> Self {
        LogMessage::Json(value)
    }
}

impl From<ErrorRecord> for LogMessage {
    fn from(record: ErrorRecord) -> Self {
        LogMessage::Error(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fmt;

    #[derive(Debug)]
    struct RootCause;

    impl fmt::Display for RootCause {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk unplugged")
        }
    }

    impl StdError for RootCause {}

    #[derive(Debug)]
    struct SaveFailed {
        source: RootCause,
    }

    impl fmt::Display for SaveFailed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "could not save profile")
        }
    }

    impl StdError for SaveFailed {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.source)
        }
    }

    #[test]
    fn test_from_error_walks_source_chain() {
        let err = SaveFailed { source: RootCause };
        let record = ErrorRecord::from_error(&err);

        assert_eq!(record.name, "SaveFailed");
        assert_eq!(record.message, "could not save profile");
        assert_eq!(record.depth(), 2);
        assert_eq!(record.cause.as_ref().unwrap().message, "disk unplugged");
    }

    #[test]
    fn test_apply_format_drops_stack() {
        let record = ErrorRecord::new("IoError", "boom")
            .with_stack("at main.rs:1")
            .apply_format(&ErrorFormat {
                include_stack: false,
                ..ErrorFormat::default()
            });

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("stack").is_none());
        assert_eq!(value["name"], "IoError");
    }

    #[test]
    fn test_apply_format_cause_chain() {
        let record = ErrorRecord::new("Outer", "outer")
            .with_cause(ErrorRecord::new("Middle", "middle").with_cause(ErrorRecord::new("Inner", "inner")));

        let kept = record.clone().apply_format(&ErrorFormat::default());
        assert_eq!(kept.depth(), 3);
        let value = serde_json::to_value(&kept).unwrap();
        assert_eq!(value["cause"]["cause"]["name"], "Inner");

        let dropped = record.apply_format(&ErrorFormat {
            include_cause: false,
            ..ErrorFormat::default()
        });
        assert_eq!(dropped.depth(), 1);
    }

    #[test]
    fn test_apply_format_metadata() {
        let record = ErrorRecord::new("HttpError", "bad gateway").with_metadata("status", 502);

        let kept = record.clone().apply_format(&ErrorFormat::default());
        assert_eq!(kept.metadata.get("status"), Some(&json!(502)));

        let dropped = record.apply_format(&ErrorFormat {
            include_metadata: false,
            ..ErrorFormat::default()
        });
        let value = serde_json::to_value(&dropped).unwrap();
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_render_payloads() {
        assert_eq!(LogMessage::from("plain").render(None), "plain");
        assert_eq!(
            LogMessage::from(json!({"a": 1})).render(None),
            "{\n  \"a\": 1\n}"
        );
        assert_eq!(
            LogMessage::from("hi").render(Some(Color::Green)),
            "\x1b[32mhi\x1b[0m"
        );
    }

    #[test]
    fn test_trim_own_frame() {
        let stack = "   0: capture\n             at src/lib.rs:1\n   1: caller\n             at src/main.rs:9";
        assert_eq!(trim_own_frame(stack), "1: caller\nat src/main.rs:9");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<SaveFailed>(), "SaveFailed");
        assert_eq!(short_type_name::<std::io::Error>(), "Error");
    }
}
