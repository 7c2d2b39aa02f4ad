//! Error types for the logger

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Rotation engine error with path
    #[error("File manager error for '{path}': {message}")]
    FileManagerError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// HTTP client error
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from an HTTP sink
    #[error("HTTP delivery to '{url}' failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Transport worker no longer accepts entries
    #[error("Transport '{0}' is closed")]
    TransportClosed(String),

    /// Transport panicked while handling an entry
    #[error("Transport '{name}' panicked: {message}")]
    TransportPanic { name: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a rotation engine error
    pub fn file_manager(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileManagerError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        LoggerError::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn transport_closed(name: impl Into<String>) -> Self {
        LoggerError::TransportClosed(name.into())
    }

    pub fn transport_panic(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::TransportPanic {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

/// Write a delivery failure to the error stream, naming the failing transport
pub fn report_error(transport: &str, error: &LoggerError) {
    eprintln!("[LOGGER ERROR] Transport '{}' failed: {}", transport, error);
}

/// Write a non-fatal diagnostic to the error stream
pub fn report_warning(message: impl std::fmt::Display) {
    eprintln!("[LOGGER WARNING] {}", message);
}
