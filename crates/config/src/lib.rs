//! Logcast Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use logcast_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[[providers]]\ntype = \"console\"").unwrap();
//! assert_eq!(config.providers.len(), 1);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [router]
//! threshold = "debug"
//!
//! [[providers]]
//! type = "console"
//! threshold = "info"
//!
//! [[providers]]
//! type = "file"
//! threshold = "warn"
//! path = "logs/app.log"
//!
//! [[providers]]
//! type = "broadcast"
//! channel = "logcast"
//! ```

mod error;
mod logging;
mod providers;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use logcast_protocol::LevelFilter;

pub use error::{ConfigError, Result};
pub use logging::{DiagnosticLevel, LogConfig};
pub use providers::{
    BroadcastProviderConfig, ConsoleProviderConfig, DEFAULT_CHANNEL,
    DEFAULT_LISTENER_QUEUE_CAPACITY, DEFAULT_QUEUE_CAPACITY, DEFAULT_RETRY_DELAY_MS,
    FileProviderConfig, ProviderConfig,
};

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Internal diagnostics
    pub log: LogConfig,

    /// Router settings
    pub router: RouterConfig,

    /// Providers, registered in the order listed
    pub providers: Vec<ProviderConfig>,
}

/// Router configuration
///
/// ```toml
/// [router]
/// threshold = "trace"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Global threshold applied before any provider threshold
    /// Default: trace
    pub threshold: LevelFilter,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            threshold: LevelFilter::Trace,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Parsing validates already; call this again after editing a config
    /// in code.
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Broadcast providers in declaration order
    pub fn broadcast_providers(&self) -> impl Iterator<Item = &BroadcastProviderConfig> {
        self.providers.iter().filter_map(|p| match p {
            ProviderConfig::Broadcast(b) => Some(b),
            _ => None,
        })
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
