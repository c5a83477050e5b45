//! Tests for levels and thresholds

use super::*;

// ============================================================================
// LogLevel
// ============================================================================

#[test]
fn test_levels_are_consecutive_from_one() {
    for (i, level) in LogLevel::ALL.iter().enumerate() {
        assert_eq!(level.as_u8(), i as u8 + 1);
        assert_eq!(LogLevel::from_u8(level.as_u8()), Some(*level));
    }
}

#[test]
fn test_level_ordering() {
    assert!(LogLevel::Trace < LogLevel::Debug);
    assert!(LogLevel::Debug < LogLevel::Info);
    assert!(LogLevel::Info < LogLevel::Warn);
    assert!(LogLevel::Warn < LogLevel::Error);
    assert!(LogLevel::Error < LogLevel::Fatal);
}

#[test]
fn test_level_from_invalid_byte() {
    assert_eq!(LogLevel::from_u8(0), None);
    assert_eq!(LogLevel::from_u8(7), None);
    assert!(matches!(
        LogLevel::try_from(200),
        Err(ProtocolError::InvalidLevel(200))
    ));
}

#[test]
fn test_level_parse_names() {
    assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
    assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert_eq!(" error ".parse::<LogLevel>().unwrap(), LogLevel::Error);
    assert_eq!("critical".parse::<LogLevel>().unwrap(), LogLevel::Fatal);
    assert!("loud".parse::<LogLevel>().is_err());
}

#[test]
fn test_level_display_pads() {
    assert_eq!(format!("{:<5}|", LogLevel::Info), "info |");
}

// ============================================================================
// LevelFilter
// ============================================================================

#[test]
fn test_filter_allows_is_monotonic() {
    for filter in [
        LevelFilter::Trace,
        LevelFilter::Debug,
        LevelFilter::Info,
        LevelFilter::Warn,
        LevelFilter::Error,
        LevelFilter::Fatal,
    ] {
        for level in LogLevel::ALL {
            assert_eq!(filter.allows(level), level.as_u8() >= filter.as_u8());
        }
    }
}

#[test]
fn test_filter_off_blocks_everything() {
    for level in LogLevel::ALL {
        assert!(!LevelFilter::Off.allows(level));
    }
    assert!(LevelFilter::Off > LevelFilter::Fatal);
}

#[test]
fn test_filter_from_level() {
    assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::Warn);
    assert_eq!(LevelFilter::from(LogLevel::Fatal), LevelFilter::Fatal);
}

#[test]
fn test_filter_parse() {
    assert_eq!("off".parse::<LevelFilter>().unwrap(), LevelFilter::Off);
    assert_eq!("Info".parse::<LevelFilter>().unwrap(), LevelFilter::Info);
    assert!("none".parse::<LevelFilter>().is_err());
}

#[test]
fn test_filter_from_u8_saturates() {
    assert_eq!(LevelFilter::from_u8(0), LevelFilter::Trace);
    assert_eq!(LevelFilter::from_u8(7), LevelFilter::Off);
    assert_eq!(LevelFilter::from_u8(255), LevelFilter::Off);
}
