//! Configuration error types

use std::io;

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - required field missing
    #[error("{component} '{name}' is missing required field '{field}'")]
    MissingField {
        /// Component type (e.g., "provider")
        component: &'static str,
        /// Name of the component
        name: String,
        /// Missing field name
        field: &'static str,
    },

    /// Validation error - invalid value
    #[error("{component} '{name}' has invalid {field}: {message}")]
    InvalidValue {
        /// Component type
        component: &'static str,
        /// Name of the component
        name: String,
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },

    /// Two broadcast providers would bind the same socket
    #[error("channel '{channel}' is used by more than one broadcast provider")]
    DuplicateChannel {
        /// The conflicting channel
        channel: String,
    },
}

impl ConfigError {
    /// Create a MissingField error
    pub fn missing_field(
        component: &'static str,
        name: impl Into<String>,
        field: &'static str,
    ) -> Self {
        Self::MissingField {
            component,
            name: name.into(),
            field,
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(
        component: &'static str,
        name: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            component,
            name: name.into(),
            field,
            message: message.into(),
        }
    }

    /// Create a DuplicateChannel error
    pub fn duplicate_channel(channel: impl Into<String>) -> Self {
        Self::DuplicateChannel {
            channel: channel.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_error() {
        let err = ConfigError::missing_field("provider", "providers[1] (file)", "path");
        assert!(err.to_string().contains("provider"));
        assert!(err.to_string().contains("providers[1] (file)"));
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid_value(
            "provider",
            "providers[0] (broadcast)",
            "queue_capacity",
            "must be greater than 0",
        );
        assert!(err.to_string().contains("queue_capacity"));
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn test_duplicate_channel_error() {
        let err = ConfigError::duplicate_channel("logcast");
        assert!(err.to_string().contains("'logcast'"));
    }
}
