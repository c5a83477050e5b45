//! File Provider - Plain-text log file
//!
//! Appends one line per message to a file:
//!
//! ```text
//! [2025-01-15T10:30:45.123Z] error [db] connection lost
//! ```
//!
//! # Failure handling
//!
//! The file is opened lazily on the first write (creating parent
//! directories) and reopened after any failure. A failed write is retried
//! once after `retry_delay`. If the retry fails too, the failure is
//! reported through `tracing::error!` and the message is dropped; `log`
//! still returns `Ok`.
//!
//! With the tracing bridge installed the report is itself a routed message:
//! the router delivers it to every provider once the current dispatch ends,
//! so sibling providers see the failure. If the report reaches this provider
//! synchronously while it is still reporting (the bridge feeds a router
//! that is not dispatching), a per-thread flag stops it from reporting
//! again.

use std::cell::Cell;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, error};

use logcast_pipeline::{Provider, ProviderError};
use logcast_protocol::LogMessage;

use crate::common::{MetricsSnapshot, Result, SinkError, SinkMetrics, format_line};

/// Default pause before the single retry
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(50);

thread_local! {
    /// Set while this thread is reporting a file failure
    static REPORTING: Cell<bool> = const { Cell::new(false) };
}

/// Configuration for the file provider
#[derive(Debug, Clone)]
pub struct FileConfig {
    /// File to append to
    pub path: PathBuf,

    /// Pause before retrying a failed write
    pub retry_delay: Duration,
}

impl FileConfig {
    /// Create config for `path` with the default retry delay
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Set the retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Appends messages to a file
pub struct FileProvider {
    name: String,
    config: FileConfig,
    file: Mutex<Option<File>>,
    metrics: SinkMetrics,
}

impl FileProvider {
    /// Create a file provider
    ///
    /// Nothing is opened until the first message arrives.
    pub fn new(config: FileConfig) -> Result<Self> {
        if config.path.as_os_str().is_empty() {
            return Err(SinkError::config("file path is empty"));
        }

        Ok(Self {
            name: format!("file:{}", config.path.display()),
            config,
            file: Mutex::new(None),
            metrics: SinkMetrics::new(),
        })
    }

    /// Path being written
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get a snapshot of the provider metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Flush the open file, if any
    pub fn flush(&self) -> io::Result<()> {
        match self.file.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Write one line, opening the file if needed
    ///
    /// On failure the handle is dropped so the next attempt reopens.
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut slot = self.file.lock();

        if slot.is_none() {
            *slot = Some(open_append(&self.config.path)?);
            debug!(path = %self.config.path.display(), "opened log file");
        }

        let result = match slot.as_mut() {
            Some(file) => file.write_all(line),
            None => Ok(()),
        };
        if result.is_err() {
            *slot = None;
        }
        result
    }

    fn report_failure(&self, message: &LogMessage, err: &io::Error) {
        if REPORTING.get() {
            return;
        }

        REPORTING.set(true);
        error!(
            path = %self.config.path.display(),
            error = %err,
            level = %message.level(),
            "failed to write log file, message dropped"
        );
        REPORTING.set(false);
    }
}

impl Provider for FileProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, message: &LogMessage) -> std::result::Result<(), ProviderError> {
        self.metrics.message_received();

        let mut line = format_line(message, Utc::now());
        line.push('\n');
        let bytes = line.as_bytes();

        let mut outcome = self.write_line(bytes);
        if outcome.is_err() {
            self.metrics.retry();
            thread::sleep(self.config.retry_delay);
            outcome = self.write_line(bytes);
        }

        match outcome {
            Ok(()) => self.metrics.message_written(bytes.len() as u64),
            Err(e) => {
                self.metrics.write_error();
                self.report_failure(message, &e);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for FileProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileProvider")
            .field("path", &self.config.path)
            .field("retry_delay", &self.config.retry_delay)
            .finish()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
