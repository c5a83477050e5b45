//! Command implementations for the logcast CLI

pub mod emit;
#[cfg(unix)]
pub mod tail;
