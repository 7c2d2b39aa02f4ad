//! Logger configuration
//!
//! `LoggerConfig` carries every option a logger is built from. It can be
//! assembled in code through [`LoggerBuilder`](super::LoggerBuilder) or
//! loaded from TOML:
//!
//! ```toml
//! min_log_level = "info"
//! show_file_name = false
//! log_format = "{level} {message}"
//!
//! [custom_colors]
//! info = "green"
//!
//! [context]
//! service = "billing"
//!
//! [[transports]]
//! kind = "file"
//! filename = "./logs/billing.log"
//! max_files = 3
//! ```

use super::color::Color;
use super::error::{LoggerError, Result};
use super::file_manager::{DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE};
use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::log_message::ErrorFormat;
use super::template::DEFAULT_LOG_FORMAT;
use super::time_format::TimeFormat;
use super::transport::{Transport, TransportOptions};
use crate::transports::{ConsoleTransport, FileTransport, FileTransportConfig};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub show_timestamp: bool,
    pub show_file_name: bool,
    pub time_format: TimeFormat,
    #[serde(deserialize_with = "level_color_map")]
    pub custom_colors: HashMap<LogLevel, Color>,
    /// Also write every line through the built-in rotation engine
    pub log_to_file: bool,
    pub log_directory: PathBuf,
    pub max_file_size: u64,
    pub max_files: usize,
    pub min_log_level: LogLevel,
    pub log_format: String,
    pub context: LogContext,
    pub error_format: ErrorFormat,
    pub transports: Vec<TransportSpec>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            show_timestamp: true,
            show_file_name: true,
            time_format: TimeFormat::default(),
            custom_colors: HashMap::new(),
            log_to_file: false,
            log_directory: PathBuf::from("./logs"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
            min_log_level: LogLevel::Debug,
            log_format: DEFAULT_LOG_FORMAT.to_string(),
            context: LogContext::new(),
            error_format: ErrorFormat::default(),
            transports: Vec::new(),
        }
    }
}

impl LoggerConfig {
    /// Parse a TOML document; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::ConfigParse`] for malformed TOML or unknown
    /// values, and a configuration error if the result fails validation.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: LoggerConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading config",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&source)
    }

    /// Check limits and the template without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(LoggerError::config("LoggerConfig", "max_file_size must be greater than 0"));
        }
        if self.max_files == 0 {
            return Err(LoggerError::config("LoggerConfig", "max_files must be at least 1"));
        }
        if self.log_format.is_empty() {
            return Err(LoggerError::config("LoggerConfig", "log_format must not be empty"));
        }
        Ok(())
    }
}

/// Declarative transport entry, as found in `[[transports]]` tables
///
/// Filters and custom formatters are closures and can only be attached in
/// code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportSpec {
    Console {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        level: Option<LogLevel>,
    },
    File {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        level: Option<LogLevel>,
        filename: PathBuf,
        #[serde(default = "default_max_file_size")]
        max_size: u64,
        #[serde(default = "default_max_files")]
        max_files: usize,
    },
    #[cfg(feature = "http")]
    Http {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        level: Option<LogLevel>,
        url: String,
        #[serde(default = "default_method")]
        method: String,
        #[serde(default)]
        headers: HashMap<String, String>,
        #[serde(default = "default_batch_size")]
        batch_size: usize,
        #[serde(default = "default_batch_timeout_ms")]
        batch_timeout_ms: u64,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
}

impl TransportSpec {
    /// Construct the transport this entry describes
    ///
    /// # Errors
    ///
    /// Propagates the transport's own construction errors.
    pub fn build(&self) -> Result<Arc<dyn Transport>> {
        match self {
            TransportSpec::Console { name, level } => Ok(Arc::new(ConsoleTransport::with_options(
                options("console", name, *level),
            ))),
            TransportSpec::File {
                name,
                level,
                filename,
                max_size,
                max_files,
            } => Ok(Arc::new(FileTransport::new(
                FileTransportConfig::new(filename)
                    .with_max_size(*max_size)
                    .with_max_files(*max_files)
                    .with_options(options("file", name, *level)),
            )?)),
            #[cfg(feature = "http")]
            TransportSpec::Http {
                name,
                level,
                url,
                method,
                headers,
                batch_size,
                batch_timeout_ms,
                timeout_ms,
            } => {
                use crate::transports::{HttpTransport, HttpTransportConfig};
                use std::time::Duration;

                let mut config = HttpTransportConfig::new(url)
                    .with_method(method)
                    .with_batch_size(*batch_size)
                    .with_batch_timeout(Duration::from_millis(*batch_timeout_ms))
                    .with_timeout(Duration::from_millis(*timeout_ms))
                    .with_options(options("http", name, *level));
                config.headers = headers.clone();
                Ok(Arc::new(HttpTransport::new(config)?))
            }
        }
    }
}

fn options(default_name: &str, name: &Option<String>, level: Option<LogLevel>) -> TransportOptions {
    let mut options = TransportOptions::new(name.as_deref().unwrap_or(default_name));
    options.level = level;
    options
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

#[cfg(feature = "http")]
fn default_method() -> String {
    "POST".to_string()
}

#[cfg(feature = "http")]
fn default_batch_size() -> usize {
    crate::transports::http::DEFAULT_BATCH_SIZE
}

#[cfg(feature = "http")]
fn default_batch_timeout_ms() -> u64 {
    crate::transports::http::DEFAULT_BATCH_TIMEOUT.as_millis() as u64
}

#[cfg(feature = "http")]
fn default_timeout_ms() -> u64 {
    crate::transports::http::DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

// Map keys arrive as plain strings; parse them with the lenient `FromStr`
fn level_color_map<'de, D>(deserializer: D) -> std::result::Result<HashMap<LogLevel, Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, Color>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(level, color)| {
            level
                .parse::<LogLevel>()
                .map(|level| (level, color))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}
