//! Tests for common provider types and utilities

use chrono::TimeZone;

use super::*;

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 45).unwrap() + chrono::Duration::milliseconds(123)
}

#[test]
fn test_metrics_new() {
    let metrics = SinkMetrics::new();
    assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
}

#[test]
fn test_metrics_counters() {
    let metrics = SinkMetrics::new();
    metrics.message_received();
    metrics.message_received();
    metrics.message_written(10);
    metrics.message_written(5);
    metrics.retry();
    metrics.write_error();

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.messages_received, 2);
    assert_eq!(snapshot.messages_written, 2);
    assert_eq!(snapshot.bytes_written, 15);
    assert_eq!(snapshot.retries, 1);
    assert_eq!(snapshot.write_errors, 1);
}

#[test]
fn test_format_timestamp() {
    assert_eq!(format_timestamp(fixed_time()), "2025-01-15T10:30:45.123Z");
}

#[test]
fn test_format_line() {
    let line = format_line(&LogMessage::error("disk", "volume full"), fixed_time());
    assert_eq!(line, "[2025-01-15T10:30:45.123Z] error [disk] volume full");
}

#[test]
fn test_format_line_metric() {
    let msg = LogMessage::new_metric(logcast_protocol::LogLevel::Info, "http", "latency", "ms", 12);
    let line = format_line(&msg, fixed_time());
    assert_eq!(line, "[2025-01-15T10:30:45.123Z] info  [http] latency = 12 ms");
}

#[test]
fn test_error_display() {
    let err = SinkError::config("path is empty");
    assert_eq!(err.to_string(), "configuration error: path is empty");
}
