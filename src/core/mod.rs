//! Core logger types and traits

pub mod color;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod formatter;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod log_message;
pub mod logger;
pub mod metrics;
pub mod template;
pub mod time_format;
pub mod transport;

pub use color::{colorize, strip_ansi, Color, ColorManager};
pub use config::{LoggerConfig, TransportSpec};
pub use error::{report_error, report_warning, LoggerError, Result};
pub use file_manager::{list_log_files, FileManager, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE};
pub use formatter::Formatter;
pub use log_context::LogContext;
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use log_message::{ErrorFormat, ErrorRecord, LogMessage};
pub use logger::{DeliveryReport, LogFuture, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use template::{Components, LogTemplate, Placeholder, DEFAULT_LOG_FORMAT};
pub use time_format::{iso8601, TimeFormat, DEFAULT_TIME_FORMAT};
pub use transport::{delivered, rejected, Delivery, EntryFilter, Transport, TransportOptions};
