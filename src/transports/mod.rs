//! Transport implementations

pub mod console;
pub mod file;
#[cfg(feature = "http")]
pub mod http;

pub use console::ConsoleTransport;
pub use file::{FileTransport, FileTransportConfig};
#[cfg(feature = "http")]
pub use http::{HttpTransport, HttpTransportConfig};

pub use crate::core::{Transport, TransportOptions};
