//! Batched HTTP transport
//!
//! Entries are buffered in memory and sent as one JSON array when either the
//! batch reaches `batch_size` or `batch_timeout` elapses since the last entry
//! was added. Delivery is at most once: a failed send is reported and the
//! batch is dropped, never retried.

use crate::core::{
    delivered, rejected, report_error, Delivery, LogEntry, LoggerError, Result, Transport,
    TransportOptions,
};
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::mem;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for an [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub timeout: Duration,
    pub options: TransportOptions,
}

impl HttpTransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "POST".to_string(),
            headers: HashMap::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            options: TransportOptions::new("http"),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Idle time after the last entry before a partial batch is sent
    #[must_use = "builder methods return a new value"]
    pub fn with_batch_timeout(mut self, batch_timeout: Duration) -> Self {
        self.batch_timeout = batch_timeout;
        self
    }

    /// Per-request timeout
    #[must_use = "builder methods return a new value"]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Default)]
struct BatchState {
    entries: Vec<Arc<LogEntry>>,
    /// Bumped whenever the idle timer is re-armed or cancelled
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl BatchState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;
    }
}

struct Shared {
    name: String,
    client: Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    state: Mutex<BatchState>,
}

impl Shared {
    async fn send(&self, entries: Vec<Arc<LogEntry>>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let body: Vec<&LogEntry> = entries.iter().map(|entry| &**entry).collect();
        let response = self
            .client
            .request(self.method.clone(), &self.url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LoggerError::http_status(&self.url, response.status().as_u16()));
        }
        Ok(())
    }
}

/// HTTP sink with size- and idle-triggered batching
///
/// The idle timer and batch sends run on the ambient tokio runtime. Outside a
/// runtime no timer is armed and a batch that is due cannot be sent: the
/// delivery is rejected and the entries stay buffered, so a later `end()`
/// called on a runtime still ships them.
///
/// # Example
///
/// ```no_run
/// use chromalog::transports::{HttpTransport, HttpTransportConfig};
/// use std::time::Duration;
///
/// let transport = HttpTransport::new(
///     HttpTransportConfig::new("https://logs.example.com/ingest")
///         .with_header("Authorization", "Bearer token")
///         .with_batch_size(50)
///         .with_batch_timeout(Duration::from_secs(2)),
/// )
/// .unwrap();
/// ```
pub struct HttpTransport {
    options: TransportOptions,
    shared: Arc<Shared>,
    batch_size: usize,
    batch_timeout: Duration,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error for a zero batch size, an invalid method or header,
    /// or when the HTTP client cannot be built.
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(LoggerError::config("HttpTransport", "batch_size must be at least 1"));
        }

        let method = Method::from_bytes(config.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| {
                LoggerError::config("HttpTransport", format!("invalid method '{}'", config.method))
            })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                LoggerError::config("HttpTransport", format!("invalid header name '{}'", name))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                LoggerError::config("HttpTransport", format!("invalid value for header '{}'", name))
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            shared: Arc::new(Shared {
                name: config.options.name.clone(),
                client,
                url: config.url,
                method,
                headers,
                state: Mutex::new(BatchState::default()),
            }),
            options: config.options,
            batch_size: config.batch_size,
            batch_timeout: config.batch_timeout,
        })
    }

    /// Entries waiting for the next send
    pub fn pending(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    fn arm_timer(&self, state: &mut BatchState) {
        state.cancel_timer();
        let Ok(runtime) = Handle::try_current() else {
            return;
        };

        let generation = state.generation;
        let shared = Arc::clone(&self.shared);
        let delay = self.batch_timeout;
        state.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let batch = {
                let mut state = shared.state.lock();
                if state.generation != generation {
                    return;
                }
                // From here on the send is in flight and no longer cancellable
                state.timer = None;
                mem::take(&mut state.entries)
            };
            if let Err(e) = shared.send(batch).await {
                report_error(&shared.name, &e);
            }
        }));
    }

    /// Put an unsent batch back in front of anything buffered since
    fn restore(&self, mut batch: Vec<Arc<LogEntry>>) {
        let mut state = self.shared.state.lock();
        batch.append(&mut state.entries);
        state.entries = batch;
    }

    fn dispatch(&self, batch: Vec<Arc<LogEntry>>) -> Delivery {
        let Ok(runtime) = Handle::try_current() else {
            self.restore(batch);
            return rejected(LoggerError::other(format!(
                "HttpTransport '{}' requires a tokio runtime to send",
                self.options.name
            )));
        };

        let shared = Arc::clone(&self.shared);
        let (ack, done) = oneshot::channel();
        runtime.spawn(async move {
            let result = shared.send(batch).await;
            if let Err(Err(e)) = ack.send(result) {
                report_error(&shared.name, &e);
            }
        });

        let name = self.options.name.clone();
        Box::pin(async move {
            match done.await {
                Ok(result) => result,
                Err(_) => Err(LoggerError::transport_closed(name)),
            }
        })
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &str {
        &self.options.name
    }

    /// Resolves immediately while the entry waits in the batch; when the entry
    /// completes a batch, resolves once that batch has been sent
    fn write(&self, entry: &Arc<LogEntry>) -> Delivery {
        if !self.options.accepts(entry) {
            return delivered();
        }

        let mut state = self.shared.state.lock();
        state.entries.push(Arc::clone(entry));

        if state.entries.len() >= self.batch_size {
            state.cancel_timer();
            let batch = mem::take(&mut state.entries);
            drop(state);
            return self.dispatch(batch);
        }

        self.arm_timer(&mut state);
        delivered()
    }

    /// Cancel the idle timer and send whatever is still buffered
    fn end(&self) -> Delivery {
        let batch = {
            let mut state = self.shared.state.lock();
            state.cancel_timer();
            mem::take(&mut state.entries)
        };
        if batch.is_empty() {
            return delivered();
        }
        self.dispatch(batch)
    }
}
