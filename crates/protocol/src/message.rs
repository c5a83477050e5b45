//! Message model
//!
//! `LogMessage` is the only payload shape the pipeline understands. A metric
//! message is a `LogMessage` that additionally carries a [`Metric`] (unit and
//! numeric value).
//!
//! Metric values are restricted to `i32` and `f64`. The constructor is generic
//! over the sealed [`MetricNumber`] trait, so any other numeric type is
//! rejected by the compiler rather than at first use.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;
use crate::level::LogLevel;

/// A structured log record
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage {
    level: LogLevel,
    category: String,
    message: String,
    metric: Option<Metric>,
}

/// Unit and value attached to a metric message
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Unit label (e.g. "ms", "bytes"); may be empty
    pub unit: String,
    /// Numeric value
    pub value: MetricValue,
}

/// The two numeric kinds a metric may carry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Int(i32),
    Double(f64),
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for f64 {}
}

/// Numeric types accepted as metric values (`i32` and `f64` only)
pub trait MetricNumber: sealed::Sealed + Copy {
    #[doc(hidden)]
    fn into_metric_value(self) -> MetricValue;
}

impl MetricNumber for i32 {
    #[inline]
    fn into_metric_value(self) -> MetricValue {
        MetricValue::Int(self)
    }
}

impl MetricNumber for f64 {
    #[inline]
    fn into_metric_value(self) -> MetricValue {
        MetricValue::Double(self)
    }
}

impl From<i32> for MetricValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl MetricValue {
    /// Parse text as an `i32`, falling back to `f64`
    ///
    /// Anything else is rejected immediately.
    pub fn parse(s: &str) -> Result<Self, ProtocolError> {
        let trimmed = s.trim();
        if let Ok(v) = trimmed.parse::<i32>() {
            return Ok(Self::Int(v));
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Ok(Self::Double(v)),
            Err(_) => Err(ProtocolError::InvalidMetricValue(s.to_string())),
        }
    }

    /// Value as f64 (lossless for both kinds)
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => f64::from(v),
            Self::Double(v) => v,
        }
    }
}

impl FromStr for MetricValue {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

impl Metric {
    /// Human-readable rendering of the value (not stored, not on the wire)
    pub fn value_text(&self) -> String {
        self.value.to_string()
    }
}

impl LogMessage {
    /// Create a plain message
    pub fn new(level: LogLevel, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            category: category.into(),
            message: message.into(),
            metric: None,
        }
    }

    /// Create a metric message
    pub fn new_metric<N: MetricNumber>(
        level: LogLevel,
        category: impl Into<String>,
        message: impl Into<String>,
        unit: impl Into<String>,
        value: N,
    ) -> Self {
        Self::new(level, category, message).with_metric(unit, value.into_metric_value())
    }

    /// Attach a metric to this message
    pub fn with_metric(mut self, unit: impl Into<String>, value: MetricValue) -> Self {
        self.metric = Some(Metric {
            unit: unit.into(),
            value,
        });
        self
    }

    pub fn trace(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Trace, category, message)
    }

    pub fn debug(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, category, message)
    }

    pub fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, category, message)
    }

    pub fn warn(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, category, message)
    }

    pub fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, category, message)
    }

    pub fn fatal(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Fatal, category, message)
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn metric(&self) -> Option<&Metric> {
        self.metric.as_ref()
    }

    #[inline]
    pub fn is_metric(&self) -> bool {
        self.metric.is_some()
    }
}

/// `level [category] message`, plus ` = value unit` for metrics
impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<5}", self.level)?;
        if !self.category.is_empty() {
            write!(f, " [{}]", self.category)?;
        }
        write!(f, " {}", self.message)?;
        if let Some(metric) = &self.metric {
            write!(f, " = {}", metric.value)?;
            if !metric.unit.is_empty() {
                write!(f, " {}", metric.unit)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
