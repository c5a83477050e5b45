//! logcast Protocol - message model and binary frame codec
//!
//! This crate provides the types that flow through the whole pipeline and
//! the wire format used to carry them between processes:
//! - `LogLevel` / `LevelFilter` - severities and thresholds
//! - `LogMessage` - a structured record, optionally carrying a `Metric`
//! - `codec` - stateless encode/decode of single frames
//! - `FrameReader` - frame decoding over any `AsyncRead`
//!
//! # Design Principles
//!
//! - **Lossless**: `decode(encode(m)) == m` for every message, metrics included
//! - **Self-describing**: every frame starts with a kind and a length, so
//!   readers can skip kinds they don't know without losing alignment
//! - **Chunk-agnostic**: stream decoding never assumes one read returns a
//!   whole field

pub mod codec;
mod error;
mod level;
mod message;
mod reader;

pub use codec::{KIND_LOG, KIND_METRIC, decode, encode, encode_into};
pub use error::ProtocolError;
pub use level::{LevelFilter, LogLevel};
pub use message::{LogMessage, Metric, MetricNumber, MetricValue};
pub use reader::{Frame, FrameReader};

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Largest frame body a reader accepts (16 MiB)
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;
