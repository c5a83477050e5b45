//! Console provider tests

use std::io::{self, Write};
use std::sync::Arc;

use chrono::{Local, TimeZone};
use parking_lot::Mutex;

use logcast_pipeline::Provider;
use logcast_protocol::{LogLevel, LogMessage};

use super::{ConsoleConfig, ConsoleProvider};

/// Writer that keeps everything in a shared buffer
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer whose every write fails
struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn plain() -> ConsoleConfig {
    ConsoleConfig {
        color: false,
        timestamps: false,
    }
}

// ============================================================================
// ConsoleConfig Tests
// ============================================================================

#[test]
fn test_config_default() {
    let config = ConsoleConfig::default();
    assert!(config.color);
    assert!(config.timestamps);
}

#[test]
fn test_config_no_color() {
    let config = ConsoleConfig::no_color();
    assert!(!config.color);
    assert!(config.timestamps);
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[test]
fn test_render_plain() {
    let provider = ConsoleProvider::with_writer(plain(), Box::new(io::sink()));
    let now = Local::now();

    assert_eq!(
        provider.render(&LogMessage::error("db", "connection lost"), now),
        "error [db] connection lost"
    );
    assert_eq!(provider.render(&LogMessage::info("", "bare"), now), "info  bare");
}

#[test]
fn test_render_metric() {
    let provider = ConsoleProvider::with_writer(plain(), Box::new(io::sink()));
    let msg = LogMessage::new_metric(LogLevel::Debug, "gc", "pause", "ms", 3.5);
    assert_eq!(provider.render(&msg, Local::now()), "debug [gc] pause = 3.5 ms");
}

#[test]
fn test_render_timestamp() {
    let config = ConsoleConfig {
        color: false,
        timestamps: true,
    };
    let provider = ConsoleProvider::with_writer(config, Box::new(io::sink()));
    let now = Local.with_ymd_and_hms(2025, 1, 15, 7, 34, 59).unwrap();

    assert_eq!(
        provider.render(&LogMessage::warn("", "hot"), now),
        "07:34:59.000 warn  hot"
    );
}

#[test]
fn test_render_color_wraps_level() {
    let config = ConsoleConfig {
        color: true,
        timestamps: false,
    };
    let provider = ConsoleProvider::with_writer(config, Box::new(io::sink()));
    let line = provider.render(&LogMessage::error("", "red"), Local::now());

    assert!(line.contains("\x1b["));
    assert!(line.contains("error"));
    assert!(line.ends_with(" red"));
}

// ============================================================================
// Provider Tests
// ============================================================================

#[test]
fn test_log_writes_lines() {
    let buffer = SharedBuffer::default();
    let provider = ConsoleProvider::with_writer(plain(), Box::new(buffer.clone()));

    provider.log(&LogMessage::info("app", "one")).unwrap();
    provider.log(&LogMessage::fatal("app", "two")).unwrap();

    assert_eq!(buffer.contents(), "info  [app] one\nfatal [app] two\n");

    let metrics = provider.metrics();
    assert_eq!(metrics.messages_received, 2);
    assert_eq!(metrics.messages_written, 2);
}

#[test]
fn test_write_failure_is_absorbed() {
    let provider = ConsoleProvider::with_writer(plain(), Box::new(BrokenPipe));

    assert!(provider.log(&LogMessage::info("", "lost")).is_ok());
    assert_eq!(provider.metrics().write_errors, 1);
}

#[test]
fn test_with_name() {
    let provider = ConsoleProvider::with_writer(plain(), Box::new(io::sink())).with_name("stderr");
    assert_eq!(provider.name(), "stderr");
}
