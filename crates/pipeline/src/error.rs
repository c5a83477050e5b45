//! Pipeline error types
//!
//! Error types for the router and the provider contract.

use thiserror::Error;

/// Error returned by a provider's `log`
///
/// Providers are expected to absorb ordinary failures themselves; this is for
/// the ones they can't.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// I/O failure in the provider's destination
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider has been shut down
    #[error("provider is closed")]
    Closed,

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Provider was never registered with the router
    #[error("provider not registered: {name}")]
    ProviderNotFound { name: String },

    /// A provider failed while handling a message
    #[error("provider '{name}' failed: {source}")]
    Provider {
        name: String,
        #[source]
        source: ProviderError,
    },
}

impl PipelineError {
    /// Create a provider not found error
    pub fn provider_not_found(name: impl Into<String>) -> Self {
        Self::ProviderNotFound { name: name.into() }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
