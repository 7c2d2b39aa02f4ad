//! Logger metrics for observability
//!
//! Counters shared by a logger and all of its children.

use std::sync::atomic::{AtomicU64, Ordering};

/// Delivery statistics
///
/// # Example
///
/// ```
/// use chromalog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_logged();
/// metrics.record_gated();
///
/// assert_eq!(metrics.total_logged(), 1);
/// assert_eq!(metrics.gated_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LoggerMetrics {
    /// Entries that passed the minimum level and were dispatched
    total_logged: AtomicU64,

    /// Calls discarded by the minimum level gate
    gated_count: AtomicU64,

    /// Per-transport deliveries that settled with an error
    delivery_failures: AtomicU64,

    /// Transports that panicked while accepting an entry
    transport_panics: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            gated_count: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            transport_panics: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn gated_count(&self) -> u64 {
        self.gated_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transport_panics(&self) -> u64 {
        self.transport_panics.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_gated(&self) -> u64 {
        self.gated_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivery_failure(&self) -> u64 {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_transport_panic(&self) -> u64 {
        self.transport_panics.fetch_add(1, Ordering::Relaxed)
    }

    /// Failed deliveries as a percentage of dispatched entries (0.0 - 100.0)
    ///
    /// With several transports one entry can fail more than once, so the
    /// value is an upper bound rather than an exact share of entries.
    pub fn failure_rate(&self) -> f64 {
        let logged = self.total_logged();
        if logged == 0 {
            return 0.0;
        }
        (self.delivery_failures() as f64 / logged as f64) * 100.0
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.total_logged.store(0, Ordering::Relaxed);
        self.gated_count.store(0, Ordering::Relaxed);
        self.delivery_failures.store(0, Ordering::Relaxed);
        self.transport_panics.store(0, Ordering::Relaxed);
    }
}
