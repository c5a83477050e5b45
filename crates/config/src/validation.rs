//! Configuration validation
//!
//! Validates config consistency:
//! - File providers name a file
//! - Broadcast providers name a channel and can queue at least one frame
//! - No two broadcast providers share a channel

use std::collections::HashSet;

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::providers::ProviderConfig;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_providers(config)
}

/// Validate provider configurations
fn validate_providers(config: &Config) -> Result<()> {
    let mut channels = HashSet::new();

    for (i, provider) in config.providers.iter().enumerate() {
        let name = format!("providers[{i}] ({})", provider.kind());

        match provider {
            ProviderConfig::Console(_) => {}
            ProviderConfig::File(file) => {
                if file.path.trim().is_empty() {
                    return Err(ConfigError::missing_field("provider", name, "path"));
                }
            }
            ProviderConfig::Broadcast(broadcast) => {
                let channel = broadcast.channel.trim();
                if channel.is_empty() {
                    return Err(ConfigError::missing_field("provider", name, "channel"));
                }
                if broadcast.queue_capacity == 0 {
                    return Err(ConfigError::invalid_value(
                        "provider",
                        name,
                        "queue_capacity",
                        "must be greater than 0",
                    ));
                }
                if broadcast.listener_queue_capacity == 0 {
                    return Err(ConfigError::invalid_value(
                        "provider",
                        name,
                        "listener_queue_capacity",
                        "must be greater than 0",
                    ));
                }
                if !channels.insert(channel) {
                    return Err(ConfigError::duplicate_channel(channel));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{Config, ConfigError};

    #[test]
    fn test_file_without_path() {
        let result = Config::from_str("[[providers]]\ntype = \"file\"");
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { field: "path", .. })
        ));
    }

    #[test]
    fn test_broadcast_with_empty_channel() {
        let result = Config::from_str("[[providers]]\ntype = \"broadcast\"\nchannel = \"\"");
        assert!(matches!(
            result,
            Err(ConfigError::MissingField {
                field: "channel",
                ..
            })
        ));
    }

    #[test]
    fn test_broadcast_with_zero_capacity() {
        let result =
            Config::from_str("[[providers]]\ntype = \"broadcast\"\nqueue_capacity = 0");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "queue_capacity",
                ..
            })
        ));
    }

    #[test]
    fn test_broadcast_with_zero_listener_capacity() {
        let result = Config::from_str(
            "[[providers]]\ntype = \"broadcast\"\nlistener_queue_capacity = 0",
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "listener_queue_capacity",
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_broadcast_channel() {
        let toml = r#"
[[providers]]
type = "broadcast"
channel = "app"

[[providers]]
type = "broadcast"
channel = "app"
"#;
        assert!(matches!(
            Config::from_str(toml),
            Err(ConfigError::DuplicateChannel { channel }) if channel == "app"
        ));
    }

    #[test]
    fn test_distinct_channels_ok() {
        let toml = r#"
[[providers]]
type = "broadcast"
channel = "a"

[[providers]]
type = "broadcast"
channel = "b"
"#;
        assert!(Config::from_str(toml).is_ok());
    }
}
