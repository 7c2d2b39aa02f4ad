//! Timestamp rendering
//!
//! Human-readable lines use a small token pattern (`HH`, `mm`, `ss`)
//! rendered against local wall-clock time. Machine-readable output always
//! uses ISO 8601 in UTC with millisecond precision.

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default pattern used by the logger and the human-readable formatters
pub const DEFAULT_TIME_FORMAT: &str = "HH:mm:ss";

/// Token pattern for clock times
///
/// The first occurrence of each of `HH`, `mm` and `ss` is replaced with the
/// zero-padded 24-hour hour, minute and second. Everything else is copied.
///
/// # Examples
///
/// ```
/// use chromalog::core::TimeFormat;
/// use chrono::{Local, TimeZone};
///
/// let at = Local.with_ymd_and_hms(2025, 1, 8, 7, 5, 9).single().unwrap();
/// assert_eq!(TimeFormat::new("HH:mm:ss").render(&at), "07:05:09");
/// assert_eq!(TimeFormat::new("HHh mm'").render(&at), "07h 05'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeFormat(String);

impl TimeFormat {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn pattern(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn render<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String {
        self.0
            .replacen("HH", &format!("{:02}", at.hour()), 1)
            .replacen("mm", &format!("{:02}", at.minute()), 1)
            .replacen("ss", &format!("{:02}", at.second()), 1)
    }

    /// Render against the local clock
    #[must_use]
    pub fn render_now(&self) -> String {
        self.render(&Local::now())
    }
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_FORMAT)
    }
}

impl From<&str> for TimeFormat {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl From<String> for TimeFormat {
    fn from(pattern: String) -> Self {
        Self::new(pattern)
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
pub fn iso8601(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
