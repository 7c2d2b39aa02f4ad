//! Console transport implementation

use crate::core::{delivered, rejected, Delivery, LogEntry, LoggerError, Transport, TransportOptions};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Writes each accepted entry as one line on standard output
///
/// Writing happens inside `write`, so the returned delivery is already
/// settled and console output order is call order.
pub struct ConsoleTransport {
    options: TransportOptions,
    sink: Option<Mutex<Box<dyn Write + Send>>>,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::with_options(TransportOptions::new("console"))
    }

    pub fn with_options(options: TransportOptions) -> Self {
        Self { options, sink: None }
    }

    /// Send lines to `writer` instead of standard output
    #[must_use = "builder methods return a new value"]
    pub fn with_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.sink = Some(Mutex::new(Box::new(writer)));
        self
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    fn emit(&self, line: &str) -> io::Result<()> {
        match &self.sink {
            Some(sink) => {
                let mut writer = sink.lock();
                writeln!(writer, "{}", line)?;
                writer.flush()
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{}", line)
            }
        }
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        &self.options.name
    }

    fn write(&self, entry: &Arc<LogEntry>) -> Delivery {
        if !self.options.accepts(entry) {
            return delivered();
        }

        let line = self.options.render(entry, |e| e.formatted_message.to_string());
        match self.emit(&line) {
            Ok(()) => delivered(),
            Err(e) => rejected(LoggerError::io_operation(
                "writing to console",
                format!("Transport '{}' could not write", self.options.name),
                e,
            )),
        }
    }
}
