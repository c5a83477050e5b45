//! Memory Provider - keeps delivered messages in memory
//!
//! For tests and for applications that want to inspect what was logged.

use parking_lot::Mutex;

use logcast_pipeline::{Provider, ProviderError};
use logcast_protocol::LogMessage;

/// Stores a copy of every delivered message
#[derive(Debug)]
pub struct MemoryProvider {
    name: String,
    messages: Mutex<Vec<LogMessage>>,
}

impl MemoryProvider {
    /// Create an empty provider
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Copy of everything stored so far, in delivery order
    pub fn snapshot(&self) -> Vec<LogMessage> {
        self.messages.lock().clone()
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Drop everything stored so far
    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl Provider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, message: &LogMessage) -> Result<(), ProviderError> {
        self.messages.lock().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;
