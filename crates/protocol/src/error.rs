//! Protocol error types
//!
//! Errors that can occur when building messages or parsing frames.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Input ended before a complete frame (or field) could be read
    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Frame length field exceeds the accepted maximum
    #[error("frame too large: {size} bytes exceeds maximum {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// Level byte outside 1..=6
    #[error("invalid log level: {0}")]
    InvalidLevel(u8),

    /// Level name that doesn't match any known level
    #[error("unknown log level name: {0:?}")]
    UnknownLevelName(String),

    /// String field is not valid UTF-8
    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    /// Metric value tag is neither i32 nor f64
    #[error("invalid metric value tag: {0}")]
    InvalidValueTag(u8),

    /// Metric value text is neither a 32-bit integer nor a double
    #[error("invalid metric value {0:?}: expected a 32-bit integer or a double")]
    InvalidMetricValue(String),

    /// A field inside the body overruns the body length
    #[error("malformed frame body: {field} overruns the frame")]
    Malformed { field: &'static str },

    /// Body contains bytes after the last field
    #[error("frame body has {0} trailing bytes")]
    TrailingBytes(usize),

    /// Underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Create a truncated error
    #[inline]
    pub fn truncated(expected: usize, actual: usize) -> Self {
        Self::Truncated { expected, actual }
    }

    /// Create a frame too large error
    #[inline]
    pub fn frame_too_large(size: usize) -> Self {
        Self::FrameTooLarge {
            size,
            max: crate::MAX_FRAME_LEN,
        }
    }

    /// Check if the stream is still aligned on a frame boundary after this error
    ///
    /// Body-level errors leave the reader positioned at the next frame, so the
    /// frame can be skipped. Header-level errors cannot be recovered from.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidLevel(_)
                | Self::Malformed { .. }
                | Self::InvalidUtf8 { .. }
                | Self::InvalidValueTag(_)
                | Self::TrailingBytes(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_truncated() {
        let err = ProtocolError::truncated(6, 2);
        assert_eq!(err.to_string(), "truncated frame: expected 6 bytes, got 2");
    }

    #[test]
    fn test_error_frame_too_large_uses_max() {
        let err = ProtocolError::frame_too_large(usize::MAX);
        assert!(matches!(
            err,
            ProtocolError::FrameTooLarge { max, .. } if max == crate::MAX_FRAME_LEN
        ));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(ProtocolError::InvalidLevel(9).is_recoverable());
        assert!(ProtocolError::InvalidUtf8 { field: "message" }.is_recoverable());
        assert!(ProtocolError::TrailingBytes(3).is_recoverable());
        assert!(ProtocolError::Malformed { field: "category" }.is_recoverable());
        assert!(!ProtocolError::truncated(4, 0).is_recoverable());
        assert!(!ProtocolError::frame_too_large(1 << 30).is_recoverable());
    }
}
