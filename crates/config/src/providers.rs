//! Provider configuration
//!
//! Each `[[providers]]` entry is tagged by `type`:
//!
//! ```toml
//! [[providers]]
//! type = "console"
//! threshold = "info"
//!
//! [[providers]]
//! type = "file"
//! path = "logs/app.log"
//!
//! [[providers]]
//! type = "broadcast"
//! channel = "logcast"
//! ```

use serde::Deserialize;

use logcast_protocol::LevelFilter;

/// Channel a broadcast provider uses when none is given
pub const DEFAULT_CHANNEL: &str = "logcast";

/// Default broadcast queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default per-listener queue capacity
pub const DEFAULT_LISTENER_QUEUE_CAPACITY: usize = 256;

/// Default file retry delay in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 50;

/// One provider registration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Terminal output
    Console(ConsoleProviderConfig),
    /// Plain-text log file
    File(FileProviderConfig),
    /// Unix socket broadcast
    Broadcast(BroadcastProviderConfig),
}

impl ProviderConfig {
    /// The `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Console(_) => "console",
            Self::File(_) => "file",
            Self::Broadcast(_) => "broadcast",
        }
    }

    /// Threshold this provider is registered with
    pub fn threshold(&self) -> LevelFilter {
        match self {
            Self::Console(c) => c.threshold,
            Self::File(c) => c.threshold,
            Self::Broadcast(c) => c.threshold,
        }
    }
}

/// Console provider configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConsoleProviderConfig {
    /// Minimum level delivered (default: trace)
    pub threshold: LevelFilter,

    /// Colored output; ignored when stdout isn't a terminal (default: true)
    pub color: bool,

    /// Prefix lines with the wall-clock time (default: true)
    pub timestamps: bool,
}

impl Default for ConsoleProviderConfig {
    fn default() -> Self {
        Self {
            threshold: LevelFilter::Trace,
            color: true,
            timestamps: true,
        }
    }
}

/// File provider configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Minimum level delivered (default: trace)
    pub threshold: LevelFilter,

    /// File to append to (required)
    pub path: String,

    /// Pause before the single retry after a failed write (default: 50)
    pub retry_delay_ms: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            threshold: LevelFilter::Trace,
            path: String::new(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

/// Broadcast provider configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BroadcastProviderConfig {
    /// Minimum level delivered (default: trace)
    pub threshold: LevelFilter,

    /// Channel name or socket path (default: "logcast")
    pub channel: String,

    /// Frames that may wait for the writer before new ones drop (default: 1024)
    pub queue_capacity: usize,

    /// Frames a listener may fall behind before it is disconnected (default: 256)
    pub listener_queue_capacity: usize,
}

impl Default for BroadcastProviderConfig {
    fn default() -> Self {
        Self {
            threshold: LevelFilter::Trace,
            channel: DEFAULT_CHANNEL.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            listener_queue_capacity: DEFAULT_LISTENER_QUEUE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        providers: Vec<ProviderConfig>,
    }

    fn parse(toml: &str) -> Vec<ProviderConfig> {
        toml::from_str::<Wrapper>(toml).unwrap().providers
    }

    #[test]
    fn test_console_defaults() {
        let providers = parse("[[providers]]\ntype = \"console\"");
        assert_eq!(
            providers,
            vec![ProviderConfig::Console(ConsoleProviderConfig::default())]
        );
        assert_eq!(providers[0].kind(), "console");
        assert_eq!(providers[0].threshold(), LevelFilter::Trace);
    }

    #[test]
    fn test_file_fields() {
        let providers = parse(
            r#"
[[providers]]
type = "file"
threshold = "warn"
path = "logs/app.log"
retry_delay_ms = 5
"#,
        );
        let ProviderConfig::File(file) = &providers[0] else {
            panic!("expected file provider");
        };
        assert_eq!(file.threshold, LevelFilter::Warn);
        assert_eq!(file.path, "logs/app.log");
        assert_eq!(file.retry_delay_ms, 5);
    }

    #[test]
    fn test_broadcast_defaults() {
        let providers = parse("[[providers]]\ntype = \"broadcast\"\nthreshold = \"off\"");
        let ProviderConfig::Broadcast(broadcast) = &providers[0] else {
            panic!("expected broadcast provider");
        };
        assert_eq!(broadcast.channel, DEFAULT_CHANNEL);
        assert_eq!(broadcast.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(
            broadcast.listener_queue_capacity,
            DEFAULT_LISTENER_QUEUE_CAPACITY
        );
        assert_eq!(providers[0].threshold(), LevelFilter::Off);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = toml::from_str::<Wrapper>("[[providers]]\ntype = \"syslog\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_type_rejected() {
        let result = toml::from_str::<Wrapper>("[[providers]]\nthreshold = \"info\"");
        assert!(result.is_err());
    }
}
