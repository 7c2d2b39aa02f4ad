//! Main logger implementation
//!
//! A `log` call is one self-contained transaction: gate by level, expand the
//! payload, render the display string once, then hand the shared entry to
//! every transport. Acceptance happens before the call returns; the returned
//! [`LogFuture`] only reports how the deliveries settled.

use super::{
    color::{colorize, strip_ansi, Color, ColorManager},
    config::LoggerConfig,
    error::{report_error, LoggerError, Result},
    file_manager::FileManager,
    log_context::LogContext,
    log_entry::LogEntry,
    log_level::LogLevel,
    log_message::{ErrorFormat, LogMessage},
    metrics::LoggerMetrics,
    template::{Components, LogTemplate},
    time_format::TimeFormat,
    transport::{Delivery, Transport},
};
use chrono::{Local, Utc};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe, Location};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

/// How one entry's deliveries settled, by transport name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// The entry was below the minimum level and never built
    pub gated: bool,
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
}

impl DeliveryReport {
    fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }

    /// True when no transport failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Completion handle returned by every logging call
///
/// Awaiting it waits for all transports to settle. Dropping it is fine:
/// entries are already queued, and failures nobody awaits are still reported
/// on standard error.
pub struct LogFuture {
    inner: BoxFuture<'static, DeliveryReport>,
}

impl LogFuture {
    fn ready(report: DeliveryReport) -> Self {
        Self {
            inner: Box::pin(futures::future::ready(report)),
        }
    }
}

impl Future for LogFuture {
    type Output = DeliveryReport;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

/// Configuration and sinks shared by a logger and all of its children
struct Shared {
    min_level: LogLevel,
    show_timestamp: bool,
    show_file_name: bool,
    time_format: TimeFormat,
    colors: ColorManager,
    template: LogTemplate,
    error_format: ErrorFormat,
    transports: Vec<Arc<dyn Transport>>,
    file_manager: Option<Mutex<FileManager>>,
    metrics: LoggerMetrics,
}

impl Shared {
    fn new(
        config: LoggerConfig,
        template: LogTemplate,
        transports: Vec<Arc<dyn Transport>>,
        file_manager: Option<FileManager>,
    ) -> Self {
        Self {
            min_level: config.min_log_level,
            show_timestamp: config.show_timestamp,
            show_file_name: config.show_file_name,
            time_format: config.time_format,
            colors: ColorManager::new(config.custom_colors),
            template,
            error_format: config.error_format,
            transports,
            file_manager: file_manager.map(Mutex::new),
            metrics: LoggerMetrics::new(),
        }
    }
}

pub struct Logger {
    shared: Arc<Shared>,
    context: LogContext,
    timers: Mutex<HashMap<String, Instant>>,
}

impl Logger {
    /// Console-only logger with default settings
    #[must_use]
    pub fn new() -> Self {
        let config = LoggerConfig::default();
        let context = config.context.clone();
        Self {
            shared: Arc::new(Shared::new(config, LogTemplate::default(), Vec::new(), None)),
            context,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use chromalog::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Info)
    ///     .show_file_name(false)
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<LogMessage>) -> LogFuture {
        self.emit(level, message.into(), None, None, Location::caller())
    }

    /// Log with the payload wrapped in `color` instead of left uncolored
    #[track_caller]
    pub fn log_colored(
        &self,
        level: LogLevel,
        message: impl Into<LogMessage>,
        color: Color,
    ) -> LogFuture {
        self.emit(level, message.into(), Some(color), None, Location::caller())
    }

    /// Log with extra context merged over this logger's context
    #[track_caller]
    pub fn log_with_context(
        &self,
        level: LogLevel,
        message: impl Into<LogMessage>,
        context: &LogContext,
    ) -> LogFuture {
        self.emit(level, message.into(), None, Some(context), Location::caller())
    }

    #[track_caller]
    pub fn log_with(
        &self,
        level: LogLevel,
        message: impl Into<LogMessage>,
        color: Option<Color>,
        context: Option<&LogContext>,
    ) -> LogFuture {
        self.emit(level, message.into(), color, context, Location::caller())
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<LogMessage>) -> LogFuture {
        self.emit(LogLevel::Debug, message.into(), None, None, Location::caller())
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<LogMessage>) -> LogFuture {
        self.emit(LogLevel::Info, message.into(), None, None, Location::caller())
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<LogMessage>) -> LogFuture {
        self.emit(LogLevel::Warn, message.into(), None, None, Location::caller())
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<LogMessage>) -> LogFuture {
        self.emit(LogLevel::Error, message.into(), None, None, Location::caller())
    }

    #[track_caller]
    pub fn debug_with_context(&self, message: impl Into<LogMessage>, context: &LogContext) -> LogFuture {
        self.emit(LogLevel::Debug, message.into(), None, Some(context), Location::caller())
    }

    #[track_caller]
    pub fn info_with_context(&self, message: impl Into<LogMessage>, context: &LogContext) -> LogFuture {
        self.emit(LogLevel::Info, message.into(), None, Some(context), Location::caller())
    }

    #[track_caller]
    pub fn warn_with_context(&self, message: impl Into<LogMessage>, context: &LogContext) -> LogFuture {
        self.emit(LogLevel::Warn, message.into(), None, Some(context), Location::caller())
    }

    #[track_caller]
    pub fn error_with_context(&self, message: impl Into<LogMessage>, context: &LogContext) -> LogFuture {
        self.emit(LogLevel::Error, message.into(), None, Some(context), Location::caller())
    }

    /// New logger with the same configuration and sinks, context merged
    ///
    /// `patch` wins on key conflicts. The parent is unchanged and the child
    /// owns a copy, so later changes to `patch` affect neither.
    #[must_use]
    pub fn child(&self, patch: &LogContext) -> Logger {
        Logger {
            shared: Arc::clone(&self.shared),
            context: self.context.merged(patch),
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Start a named timer, replacing any running timer with that label
    pub fn time(&self, label: impl Into<String>) {
        self.timers.lock().insert(label.into(), Instant::now());
    }

    /// Stop a timer and log its elapsed time at info level
    ///
    /// An unknown label logs a warning instead.
    #[track_caller]
    pub fn time_end(&self, label: &str) -> LogFuture {
        let location = Location::caller();
        let started = self.timers.lock().remove(label);
        match started {
            Some(started) => {
                let elapsed = started.elapsed().as_secs_f64() * 1000.0;
                let message = format!("{}: {:.2}ms", label, elapsed);
                self.emit(LogLevel::Info, message.into(), None, None, location)
            }
            None => {
                let message = format!("Timer '{}' does not exist", label);
                self.emit(LogLevel::Warn, message.into(), None, None, location)
            }
        }
    }

    /// Flush every transport and wait for all of them to settle
    ///
    /// Each failure is reported on standard error; the first one is returned.
    pub async fn end(&self) -> Result<()> {
        let pending = self.shared.transports.iter().map(|transport| {
            let name = transport.name().to_string();
            let delivery = panic::catch_unwind(AssertUnwindSafe(|| transport.end()));
            if delivery.is_err() {
                self.shared.metrics.record_transport_panic();
            }
            settle(Arc::clone(&self.shared), name, delivery)
        });

        let mut first_error = None;
        for (name, outcome) in join_all(pending).await {
            if let Err(e) = outcome {
                report_error(&name, &e);
                self.shared.metrics.record_delivery_failure();
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.shared.min_level
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// Names of the attached transports, in registration order
    pub fn transport_names(&self) -> Vec<String> {
        self.shared
            .transports
            .iter()
            .map(|transport| transport.name().to_string())
            .collect()
    }

    /// Directory of the built-in rotation engine, if file logging is on
    pub fn log_directory(&self) -> Option<PathBuf> {
        self.shared
            .file_manager
            .as_ref()
            .map(|manager| manager.lock().directory().to_path_buf())
    }

    fn emit(
        &self,
        level: LogLevel,
        message: LogMessage,
        color: Option<Color>,
        extra: Option<&LogContext>,
        location: &'static Location<'static>,
    ) -> LogFuture {
        let shared = &self.shared;
        if level < shared.min_level {
            shared.metrics.record_gated();
            return LogFuture::ready(DeliveryReport::gated());
        }

        let message = message.expand(&shared.error_format);
        let context = match extra {
            Some(extra) if !extra.is_empty() => self.context.merged(extra),
            _ => self.context.clone(),
        };
        let timestamp = Utc::now();
        let file_name = if shared.show_file_name {
            call_site(location)
        } else {
            String::new()
        };

        let level_part = colorize(level.label(), shared.colors.get_level_color(level));
        let timestamp_part = if shared.show_timestamp {
            format!("[{}]", shared.time_format.render(&timestamp.with_timezone(&Local)))
        } else {
            String::new()
        };
        let file_part = if file_name.is_empty() {
            String::new()
        } else {
            format!("[{}]", file_name)
        };
        let context_part = context.to_inline_json();
        let message_part = message.render(color);

        let formatted = shared.template.render(&Components {
            level: &level_part,
            timestamp: &timestamp_part,
            file_name: &file_part,
            context: &context_part,
            message: &message_part,
        });

        let entry = Arc::new(LogEntry {
            timestamp,
            level,
            message,
            context,
            file_name,
            formatted_message: Arc::from(formatted),
        });
        shared.metrics.record_logged();

        if let Some(manager) = &shared.file_manager {
            if let Err(e) = manager.lock().write(&strip_ansi(&entry.formatted_message)) {
                report_error("file", &e);
                shared.metrics.record_delivery_failure();
            }
        }

        if shared.transports.is_empty() {
            println!("{}", entry.formatted_message);
            return LogFuture::ready(DeliveryReport::default());
        }

        let mut report = DeliveryReport::default();
        let mut pending = Vec::with_capacity(shared.transports.len());
        for transport in &shared.transports {
            let name = transport.name().to_string();
            let delivery = panic::catch_unwind(AssertUnwindSafe(|| transport.write(&entry)));
            if delivery.is_err() {
                shared.metrics.record_transport_panic();
            }
            pending.push(settle(Arc::clone(shared), name, delivery));
        }

        let shared = Arc::clone(&self.shared);
        LogFuture {
            inner: Box::pin(async move {
                for (name, outcome) in join_all(pending).await {
                    match outcome {
                        Ok(()) => report.delivered.push(name),
                        Err(e) => {
                            report_error(&name, &e);
                            shared.metrics.record_delivery_failure();
                            report.failed.push(name);
                        }
                    }
                }
                report
            }),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve one transport's delivery, converting panics into errors
///
/// A panic raised by the call that produced `delivery` is already counted;
/// a panic while awaiting it is counted here.
async fn settle(
    shared: Arc<Shared>,
    name: String,
    delivery: std::result::Result<Delivery, Box<dyn Any + Send>>,
) -> (String, Result<()>) {
    let outcome = match delivery {
        Ok(delivery) => match AssertUnwindSafe(delivery).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                shared.metrics.record_transport_panic();
                Err(LoggerError::transport_panic(&name, panic_message(&*payload)))
            }
        },
        Err(payload) => Err(LoggerError::transport_panic(&name, panic_message(&*payload))),
    };
    (name, outcome)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// `file:line` of the caller, file reduced to its base name
fn call_site(location: &Location<'_>) -> String {
    let file = Path::new(location.file())
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(location.file());
    format!("{}:{}", file, location.line())
}

/// Builder for Logger
///
/// # Example
/// ```
/// use chromalog::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .log_format("{level} {message}")
///     .context_field("service", "checkout")
///     .custom_color(LogLevel::Info, Color::Green)
///     .transport(ConsoleTransport::new())
///     .build()
///     .unwrap();
///
/// assert_eq!(logger.transport_names(), vec!["console"]);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    transports: Vec<Arc<dyn Transport>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            transports: Vec::new(),
        }
    }

    /// Start from a loaded configuration, including its declared transports
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            transports: Vec::new(),
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.min_log_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_timestamp(mut self, show: bool) -> Self {
        self.config.show_timestamp = show;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_file_name(mut self, show: bool) -> Self {
        self.config.show_file_name = show;
        self
    }

    /// Clock pattern with `HH`, `mm` and `ss` tokens
    #[must_use = "builder methods return a new value"]
    pub fn time_format(mut self, pattern: impl Into<TimeFormat>) -> Self {
        self.config.time_format = pattern.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn custom_color(mut self, level: LogLevel, color: Color) -> Self {
        self.config.custom_colors.insert(level, color);
        self
    }

    /// Write every line, color stripped, into rotated `log_<millis>.log` files
    #[must_use = "builder methods return a new value"]
    pub fn log_to_file(mut self, enabled: bool) -> Self {
        self.config.log_to_file = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.log_directory = directory.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_files(mut self, count: usize) -> Self {
        self.config.max_files = count;
        self
    }

    /// Line template with `{level}`, `{timestamp}`, `{fileName}`, `{context}`
    /// and `{message}` placeholders
    #[must_use = "builder methods return a new value"]
    pub fn log_format(mut self, template: impl Into<String>) -> Self {
        self.config.log_format = template.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn context(mut self, context: LogContext) -> Self {
        self.config.context = context;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn context_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.context.add_field(key, value);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_format(mut self, format: ErrorFormat) -> Self {
        self.config.error_format = format;
        self
    }

    /// Add a transport
    #[must_use = "builder methods return a new value"]
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transports.push(Arc::new(transport));
        self
    }

    /// Add a transport that is also held elsewhere
    #[must_use = "builder methods return a new value"]
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transports.push(transport);
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// Returns an error for invalid limits or template, when a declared
    /// transport cannot be constructed, or when the log directory cannot be
    /// set up.
    pub fn build(self) -> Result<Logger> {
        let config = self.config;
        config.validate()?;
        let template = LogTemplate::parse(&config.log_format)?;

        let mut transports = Vec::with_capacity(config.transports.len() + self.transports.len());
        for spec in &config.transports {
            transports.push(spec.build()?);
        }
        transports.extend(self.transports);

        let file_manager = if config.log_to_file {
            Some(FileManager::new(
                &config.log_directory,
                config.max_file_size,
                config.max_files,
            )?)
        } else {
            None
        };

        let context = config.context.clone();
        Ok(Logger {
            shared: Arc::new(Shared::new(config, template, transports, file_manager)),
            context,
            timers: Mutex::new(HashMap::new()),
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
