//! Logcast - Sinks
//!
//! Leaf providers for the logcast router.
//!
//! # Architecture
//!
//! Each provider implements `logcast_pipeline::Provider` and is called
//! synchronously by the router, on the logging thread, for every message
//! that passes its threshold.
//!
//! ```text
//! [Router] --&LogMessage--> [Provider::log] --> [Destination]
//! ```
//!
//! # Available Providers
//!
//! | Provider | Purpose |
//! |----------|---------|
//! | `console` | Colored terminal output |
//! | `file` | Plain-text log file with one retry |
//! | `memory` | In-memory capture for tests and inspection |
//!
//! The broadcast provider lives in `logcast-tap`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use logcast_sinks::console::{ConsoleConfig, ConsoleProvider};
//!
//! let console = Arc::new(ConsoleProvider::new(ConsoleConfig::default()));
//! router.add_provider(console, LevelFilter::Info);
//! ```

/// Console provider - human-readable terminal output
pub mod console;

/// File provider - plain-text log file
pub mod file;

/// Memory provider - in-memory capture
pub mod memory;

mod common;

pub use common::{MetricsSnapshot, Result, SinkError, SinkMetrics, format_line, format_timestamp};
pub use console::{ConsoleConfig, ConsoleProvider};
pub use file::{FileConfig, FileProvider};
pub use memory::MemoryProvider;
