//! Structured context attached to loggers and entries
//!
//! A `LogContext` is a plain value: loggers own one, children receive a
//! merged copy, and nothing is shared by reference. Mutating a context after
//! handing it to [`Logger::child`](crate::Logger::child) therefore cannot
//! affect loggers that were already created.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Context for structured logging with key-value fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogContext {
    fields: Map<String, Value>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get all fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Return a new context with `patch` applied on top; patch keys win
    #[must_use]
    pub fn merged(&self, patch: &LogContext) -> LogContext {
        let mut fields = self.fields.clone();
        for (key, value) in &patch.fields {
            fields.insert(key.clone(), value.clone());
        }
        LogContext { fields }
    }

    /// Compact inline JSON, empty string for an empty context
    pub fn to_inline_json(&self) -> String {
        if self.fields.is_empty() {
            return String::new();
        }
        serde_json::to_string(&self.fields).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for LogContext {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for LogContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_inline_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_context_creation() {
        let ctx = LogContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.to_inline_json(), "");
    }

    #[test]
    fn test_log_context_with_fields() {
        let ctx = LogContext::new()
            .with_field("user_id", 123)
            .with_field("username", "john_doe")
            .with_field("active", true);

        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.get("user_id"), Some(&json!(123)));
    }

    #[test]
    fn test_merge_patch_wins() {
        let base = LogContext::new().with_field("a", 1).with_field("b", 1);
        let patch = LogContext::new().with_field("b", 2).with_field("c", 3);

        let merged = base.merged(&patch);
        assert_eq!(merged.get("a"), Some(&json!(1)));
        assert_eq!(merged.get("b"), Some(&json!(2)));
        assert_eq!(merged.get("c"), Some(&json!(3)));

        // Inputs untouched
        assert_eq!(base.get("b"), Some(&json!(1)));
        assert!(base.get("c").is_none());
    }

    #[test]
    fn test_inline_json() {
        let ctx = LogContext::new()
            .with_field("request", "abc")
            .with_field("nested", json!({"k": [1, 2]}));
        assert_eq!(
            ctx.to_inline_json(),
            r#"{"nested":{"k":[1,2]},"request":"abc"}"#
        );
    }

    #[test]
    fn test_collect_from_pairs() {
        let ctx: LogContext = vec![("service", "api"), ("region", "eu")]
            .into_iter()
            .collect();
        assert_eq!(ctx.len(), 2);
    }
}
