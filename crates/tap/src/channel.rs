//! Channel names
//!
//! A channel is the name a broadcast server and its listeners agree on out
//! of band. It maps onto a Unix socket path:
//!
//! - a name containing `/` is taken verbatim as the socket path
//! - anything else becomes `<temp_dir>/logcast-<name>.sock`

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, TapError};

/// Channel used when none is configured
pub const DEFAULT_CHANNEL: &str = "logcast";

/// A named broadcast channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    name: String,
}

impl Channel {
    /// Create a channel, rejecting empty names
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TapError::InvalidChannel(name));
        }
        Ok(Self { name })
    }

    /// The name as given
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Socket path this channel listens on
    pub fn socket_path(&self) -> PathBuf {
        if self.name.contains('/') {
            PathBuf::from(&self.name)
        } else {
            std::env::temp_dir().join(format!("logcast-{}.sock", self.name))
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            name: DEFAULT_CHANNEL.to_string(),
        }
    }
}

impl FromStr for Channel {
    type Err = TapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
#[path = "channel_test.rs"]
mod tests;
