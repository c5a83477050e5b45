//! Router metrics
//!
//! Atomic counters for tracking router activity.
//! All operations use relaxed ordering; values are eventually consistent.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the router
#[derive(Debug, Default)]
pub struct RouterMetrics {
    /// Total `log` calls
    messages_received: AtomicU64,

    /// Messages rejected by the global threshold
    messages_filtered: AtomicU64,

    /// Messages that reached at least one provider
    messages_delivered: AtomicU64,

    /// Individual provider deliveries
    deliveries: AtomicU64,

    /// Provider calls that returned an error
    provider_errors: AtomicU64,

    /// Re-entrant `log` calls queued behind the running dispatch
    reentrant_deferred: AtomicU64,

    /// Re-entrant `log` calls dropped while queued messages were delivered
    reentrant_dropped: AtomicU64,
}

impl RouterMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            messages_filtered: AtomicU64::new(0),
            messages_delivered: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            provider_errors: AtomicU64::new(0),
            reentrant_deferred: AtomicU64::new(0),
            reentrant_dropped: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_filtered(&self) {
        self.messages_filtered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one dispatch loop
    #[inline]
    pub fn record_dispatch(&self, delivered_to: usize) {
        if delivered_to > 0 {
            self.messages_delivered.fetch_add(1, Ordering::Relaxed);
            self.deliveries
                .fetch_add(delivered_to as u64, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_provider_error(&self) {
        self.provider_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_reentrant_deferred(&self) {
        self.reentrant_deferred.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_reentrant_drop(&self) {
        self.reentrant_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_filtered: self.messages_filtered.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            provider_errors: self.provider_errors.load(Ordering::Relaxed),
            reentrant_deferred: self.reentrant_deferred.load(Ordering::Relaxed),
            reentrant_dropped: self.reentrant_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of router metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub messages_filtered: u64,
    pub messages_delivered: u64,
    pub deliveries: u64,
    pub provider_errors: u64,
    pub reentrant_deferred: u64,
    pub reentrant_dropped: u64,
}
