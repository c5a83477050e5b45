//! Tests for the message model

use super::*;

#[test]
fn test_new_message() {
    let msg = LogMessage::new(LogLevel::Info, "net", "connected");
    assert_eq!(msg.level(), LogLevel::Info);
    assert_eq!(msg.category(), "net");
    assert_eq!(msg.message(), "connected");
    assert!(!msg.is_metric());
    assert!(msg.metric().is_none());
}

#[test]
fn test_level_shortcuts() {
    assert_eq!(LogMessage::trace("", "").level(), LogLevel::Trace);
    assert_eq!(LogMessage::debug("", "").level(), LogLevel::Debug);
    assert_eq!(LogMessage::info("", "").level(), LogLevel::Info);
    assert_eq!(LogMessage::warn("", "").level(), LogLevel::Warn);
    assert_eq!(LogMessage::error("", "").level(), LogLevel::Error);
    assert_eq!(LogMessage::fatal("", "").level(), LogLevel::Fatal);
}

#[test]
fn test_empty_fields_are_empty_strings() {
    let msg = LogMessage::info(String::new(), String::new());
    assert_eq!(msg.category(), "");
    assert_eq!(msg.message(), "");
}

#[test]
fn test_structural_equality() {
    assert_eq!(LogMessage::warn("a", "b"), LogMessage::warn("a", "b"));
    assert_ne!(LogMessage::warn("a", "b"), LogMessage::error("a", "b"));
}

// ============================================================================
// Metrics
// ============================================================================

#[test]
fn test_metric_int() {
    let msg = LogMessage::new_metric(LogLevel::Info, "db", "query time", "ms", 42);
    let metric = msg.metric().unwrap();
    assert_eq!(metric.unit, "ms");
    assert_eq!(metric.value, MetricValue::Int(42));
    assert_eq!(metric.value_text(), "42");
}

#[test]
fn test_metric_double() {
    let msg = LogMessage::new_metric(LogLevel::Debug, "cpu", "load", "%", 12.5);
    let metric = msg.metric().unwrap();
    assert_eq!(metric.value, MetricValue::Double(12.5));
    assert_eq!(metric.value_text(), "12.5");
}

#[test]
fn test_metric_value_parse() {
    assert_eq!(MetricValue::parse("7").unwrap(), MetricValue::Int(7));
    assert_eq!(MetricValue::parse("-3").unwrap(), MetricValue::Int(-3));
    assert_eq!(MetricValue::parse("0.25").unwrap(), MetricValue::Double(0.25));
    // Too large for i32, still a valid double
    assert_eq!(
        MetricValue::parse("3000000000").unwrap(),
        MetricValue::Double(3_000_000_000.0)
    );
}

#[test]
fn test_metric_value_parse_rejects_other_kinds() {
    assert!(matches!(
        MetricValue::parse("twelve"),
        Err(ProtocolError::InvalidMetricValue(_))
    ));
    assert!("".parse::<MetricValue>().is_err());
}

#[test]
fn test_metric_value_as_f64() {
    assert_eq!(MetricValue::Int(-4).as_f64(), -4.0);
    assert_eq!(MetricValue::Double(1.5).as_f64(), 1.5);
}

// ============================================================================
// Display
// ============================================================================

#[test]
fn test_display_plain() {
    let msg = LogMessage::error("disk", "full");
    assert_eq!(msg.to_string(), "error [disk] full");
}

#[test]
fn test_display_without_category() {
    let msg = LogMessage::info("", "hello");
    assert_eq!(msg.to_string(), "info  hello");
}

#[test]
fn test_display_metric() {
    let msg = LogMessage::new_metric(LogLevel::Info, "http", "latency", "ms", 12);
    assert_eq!(msg.to_string(), "info  [http] latency = 12 ms");
}
