//! # chromalog
//!
//! Structured logging with colored terminal output, pluggable transports and
//! size-bounded file rotation.
//!
//! ## Features
//!
//! - **Render once**: every entry's display string is built a single time
//!   from a `{level} {timestamp} {fileName} {context} {message}` template
//!   and shared by all transports
//! - **Transports**: console, rotating file (dedicated writer thread) and
//!   batched HTTP (behind the `http` feature), plus any `Transport` impl
//! - **Isolation**: a failing or panicking transport never affects its
//!   siblings or the caller
//! - **Child loggers**: inherit configuration and sinks with merged context
//!
//! ## Example
//!
//! ```
//! use chromalog::prelude::*;
//!
//! let logger = Logger::builder()
//!     .min_level(LogLevel::Info)
//!     .context_field("service", "api")
//!     .transport(ConsoleTransport::new())
//!     .build()
//!     .unwrap();
//!
//! let request = logger.child(&LogContext::new().with_field("request_id", 7));
//! request.info("handled");
//! ```

pub mod core;
pub mod formatters;
pub mod macros;
pub mod transports;

pub mod prelude {
    pub use crate::core::{
        Color, ErrorFormat, ErrorRecord, Formatter, LogContext, LogEntry, LogLevel, LogMessage,
        Logger, LoggerBuilder, LoggerConfig, LoggerError, Result, Transport, TransportOptions,
    };
    pub use crate::formatters::{FormatterOptions, JsonFormatter, PrettyFormatter, SimpleFormatter};
    pub use crate::transports::{ConsoleTransport, FileTransport, FileTransportConfig};
    #[cfg(feature = "http")]
    pub use crate::transports::{HttpTransport, HttpTransportConfig};
}

pub use core::{
    Color, DeliveryReport, ErrorFormat, ErrorRecord, Formatter, LogContext, LogEntry, LogFuture,
    LogLevel, LogMessage, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, Result,
    Transport, TransportOptions,
};
