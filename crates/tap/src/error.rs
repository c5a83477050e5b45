//! Error types for the tap crate

use std::io;

use thiserror::Error;

use logcast_protocol::ProtocolError;

/// Errors that can occur in the broadcast transport
#[derive(Error, Debug)]
pub enum TapError {
    /// I/O error (socket operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Frame stream could not be decoded
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Channel name can't be mapped to a socket
    #[error("invalid channel name: {0:?}")]
    InvalidChannel(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for tap operations
pub type Result<T> = std::result::Result<T, TapError>;
