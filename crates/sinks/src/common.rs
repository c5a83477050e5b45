//! Common types and utilities for providers
//!
//! Shared functionality across all provider types.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use thiserror::Error;

use logcast_protocol::LogMessage;

/// Metrics shared by all provider types
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Messages handed to the provider
    pub messages_received: AtomicU64,

    /// Messages successfully written
    pub messages_written: AtomicU64,

    /// Total bytes written
    pub bytes_written: AtomicU64,

    /// Writes that failed even after retrying
    pub write_errors: AtomicU64,

    /// Retries attempted after a failed write
    pub retries: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            messages_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        }
    }

    /// Record a received message
    #[inline]
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully written message
    #[inline]
    pub fn message_written(&self, bytes: u64) {
        self.messages_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a write error
    #[inline]
    pub fn write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a retry
    #[inline]
    pub fn retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_written: self.messages_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of provider metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub messages_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
    pub retries: u64,
}

/// Common provider errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for provider construction
pub type Result<T> = std::result::Result<T, SinkError>;

/// Format a timestamp the way every plain-text line starts
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// One plain-text line for a message, without the trailing newline
///
/// ```text
/// [2025-01-15T10:30:45.123Z] error [disk] volume full
/// [2025-01-15T10:30:45.124Z] info  [http] latency = 12 ms
/// ```
pub fn format_line(message: &LogMessage, ts: DateTime<Utc>) -> String {
    format!("[{}] {}", format_timestamp(ts), message)
}

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;
