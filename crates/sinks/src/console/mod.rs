//! Console Provider - Human-readable terminal output
//!
//! Writes one line per message to stdout, or to any injected writer.
//!
//! # Example Output
//!
//! ```text
//! 07:34:59.161 info  [http] request done
//! 07:34:59.162 error [db] connection lost
//! 07:35:00.100 debug [gc] pause = 3.5 ms
//! ```

use std::io::{self, Write};

use chrono::{DateTime, Local};
use owo_colors::{OwoColorize, Style};
use parking_lot::Mutex;

use logcast_pipeline::{Provider, ProviderError};
use logcast_protocol::{LogLevel, LogMessage};

use crate::common::{MetricsSnapshot, SinkMetrics};

/// Configuration for the console provider
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Enable colored output
    pub color: bool,

    /// Prefix each line with the local wall-clock time
    pub timestamps: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            color: true,
            timestamps: true,
        }
    }
}

impl ConsoleConfig {
    /// Create config with colors disabled (for piped output)
    pub fn no_color() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }
}

// =============================================================================
// Color Styles
// =============================================================================

/// Color styles for terminal output
struct Styles {
    enabled: bool,
    timestamp: Style,
    category: Style,
    metric: Style,
}

impl Styles {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timestamp: Style::new().dimmed(),
            category: Style::new().cyan(),
            metric: Style::new().magenta(),
        }
    }

    /// Apply `style` only when colors are enabled
    fn paint(&self, text: &str, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Get style for log level
pub fn level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Fatal => Style::new().red().bold(),
        LogLevel::Error => Style::new().red(),
        LogLevel::Warn => Style::new().yellow(),
        LogLevel::Info => Style::new().green(),
        LogLevel::Debug => Style::new(),
        LogLevel::Trace => Style::new().dimmed(),
    }
}

/// Writes messages to the terminal
pub struct ConsoleProvider {
    name: String,
    config: ConsoleConfig,
    styles: Styles,
    writer: Mutex<Box<dyn Write + Send>>,
    metrics: SinkMetrics,
}

impl ConsoleProvider {
    /// Create a console provider writing to stdout
    pub fn new(config: ConsoleConfig) -> Self {
        Self::with_writer(config, Box::new(io::stdout()))
    }

    /// Create a console provider writing to `writer`
    pub fn with_writer(config: ConsoleConfig, writer: Box<dyn Write + Send>) -> Self {
        Self {
            name: "console".to_string(),
            styles: Styles::new(config.color),
            config,
            writer: Mutex::new(writer),
            metrics: SinkMetrics::new(),
        }
    }

    /// Use a different provider name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get a snapshot of the provider metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Render one line, without the trailing newline
    pub fn render(&self, message: &LogMessage, now: DateTime<Local>) -> String {
        let styles = &self.styles;
        let mut line = String::new();

        if self.config.timestamps {
            let ts = now.format("%H:%M:%S%.3f").to_string();
            line.push_str(&styles.paint(&ts, styles.timestamp));
            line.push(' ');
        }

        let level = format!("{:<5}", message.level().as_str());
        line.push_str(&styles.paint(&level, level_style(message.level())));

        if !message.category().is_empty() {
            let category = format!("[{}]", message.category());
            line.push(' ');
            line.push_str(&styles.paint(&category, styles.category));
        }

        line.push(' ');
        line.push_str(message.message());

        if let Some(metric) = message.metric() {
            let mut value = metric.value_text();
            if !metric.unit.is_empty() {
                value.push(' ');
                value.push_str(&metric.unit);
            }
            line.push_str(" = ");
            line.push_str(&styles.paint(&value, styles.metric));
        }

        line
    }
}

impl Provider for ConsoleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, message: &LogMessage) -> Result<(), ProviderError> {
        self.metrics.message_received();

        let mut line = self.render(message, Local::now());
        line.push('\n');

        let mut writer = self.writer.lock();
        match writer.write_all(line.as_bytes()).and_then(|()| writer.flush()) {
            Ok(()) => self.metrics.message_written(line.len() as u64),
            // A closed terminal or pipe is not the caller's problem
            Err(_) => self.metrics.write_error(),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod console_test;
