//! Frame codec
//!
//! Stateless, lossless mapping between a [`LogMessage`] and a byte frame.
//!
//! # Wire Format
//!
//! All integers are little-endian.
//!
//! ```text
//! ┌────────┬──────────┬───────┬──────────────────┬──────────────────┐
//! │ kind   │ length L │ level │ category         │ message          │
//! │ u16    │ u32      │ u8    │ u32 len + UTF-8  │ u32 len + UTF-8  │
//! └────────┴──────────┴───────┴──────────────────┴──────────────────┘
//!  0        2          6       7
//! ```
//!
//! `L` counts every byte after the length field. Metric frames
//! (`KIND_METRIC`) append the unit (u32 len + UTF-8), a value tag byte
//! (`0` = i32, `1` = f64) and the value itself.
//!
//! A frame whose kind is not recognised decodes to "nothing" rather than an
//! error, so newer writers can add kinds without breaking older readers.
//!
//! No frame body is larger than [`MAX_FRAME_LEN`]: `encode` refuses such a
//! message and readers reject such a header, whatever its kind. A header
//! announcing more cannot be told apart from a corrupt stream, so it is an
//! error rather than a skip.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;
use crate::level::LogLevel;
use crate::message::{LogMessage, MetricValue};
use crate::{MAX_FRAME_LEN, Result};

/// Kind identifier for plain log records
pub const KIND_LOG: u16 = 0x0001;

/// Kind identifier for metric records
pub const KIND_METRIC: u16 = 0x0002;

/// Size of the kind + length header
pub const HEADER_LEN: usize = 6;

const VALUE_TAG_INT: u8 = 0;
const VALUE_TAG_DOUBLE: u8 = 1;

/// Check whether this codec understands a frame kind
#[inline]
pub fn is_known_kind(kind: u16) -> bool {
    matches!(kind, KIND_LOG | KIND_METRIC)
}

/// Kind identifier a message is framed with
#[inline]
pub fn kind_of(message: &LogMessage) -> u16 {
    if message.is_metric() {
        KIND_METRIC
    } else {
        KIND_LOG
    }
}

/// Encode a message into a new frame
///
/// Fails with `FrameTooLarge` if the body would exceed [`MAX_FRAME_LEN`].
pub fn encode(message: &LogMessage) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(encoded_len(message));
    encode_into(message, &mut buf)?;
    Ok(buf.freeze())
}

/// Append one frame to `buf`
///
/// Nothing is written if the body would exceed [`MAX_FRAME_LEN`].
pub fn encode_into(message: &LogMessage, buf: &mut BytesMut) -> Result<()> {
    let body_len = encoded_len(message) - HEADER_LEN;
    if body_len > MAX_FRAME_LEN {
        return Err(ProtocolError::frame_too_large(body_len));
    }

    let start = buf.len();

    buf.put_u16_le(kind_of(message));

    // Length placeholder, patched once the body is written
    let len_pos = buf.len();
    buf.put_u32_le(0);

    buf.put_u8(message.level().as_u8());
    put_string(message.category(), buf);
    put_string(message.message(), buf);

    if let Some(metric) = message.metric() {
        put_string(&metric.unit, buf);
        match metric.value {
            MetricValue::Int(v) => {
                buf.put_u8(VALUE_TAG_INT);
                buf.put_i32_le(v);
            }
            MetricValue::Double(v) => {
                buf.put_u8(VALUE_TAG_DOUBLE);
                buf.put_f64_le(v);
            }
        }
    }

    let written = (buf.len() - start - HEADER_LEN) as u32;
    buf[len_pos..len_pos + 4].copy_from_slice(&written.to_le_bytes());
    Ok(())
}

/// Exact size of the frame `encode` produces
pub fn encoded_len(message: &LogMessage) -> usize {
    let mut len = HEADER_LEN + 1 + 4 + message.category().len() + 4 + message.message().len();
    if let Some(metric) = message.metric() {
        len += 4 + metric.unit.len() + 1;
        len += match metric.value {
            MetricValue::Int(_) => 4,
            MetricValue::Double(_) => 8,
        };
    }
    len
}

/// Parse the kind + length header
///
/// Returns `(kind, body_len)`. Fails if the body length exceeds
/// [`MAX_FRAME_LEN`].
pub fn decode_header(header: [u8; HEADER_LEN]) -> Result<(u16, usize)> {
    let kind = u16::from_le_bytes([header[0], header[1]]);
    let len = u32::from_le_bytes([header[2], header[3], header[4], header[5]]) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::frame_too_large(len));
    }
    Ok((kind, len))
}

/// Decode one complete frame held in memory
///
/// Returns `Ok(None)` when the kind is not recognised.
pub fn decode(frame: &[u8]) -> Result<Option<LogMessage>> {
    if frame.len() < HEADER_LEN {
        return Err(ProtocolError::truncated(HEADER_LEN, frame.len()));
    }
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(&frame[..HEADER_LEN]);
    let (kind, len) = decode_header(header)?;

    let available = frame.len() - HEADER_LEN;
    if available < len {
        return Err(ProtocolError::truncated(len, available));
    }

    decode_body(
        kind,
        Bytes::copy_from_slice(&frame[HEADER_LEN..HEADER_LEN + len]),
    )
}

/// Parse a frame body of a known size
///
/// `body` must hold exactly the `L` bytes announced by the header.
/// Returns `Ok(None)` when the kind is not recognised.
pub fn decode_body(kind: u16, mut body: Bytes) -> Result<Option<LogMessage>> {
    if !is_known_kind(kind) {
        return Ok(None);
    }

    if !body.has_remaining() {
        return Err(ProtocolError::Malformed { field: "level" });
    }
    let level = LogLevel::try_from(body.get_u8())?;
    let category = get_string(&mut body, "category")?;
    let message = get_string(&mut body, "message")?;

    let mut msg = LogMessage::new(level, category, message);

    if kind == KIND_METRIC {
        let unit = get_string(&mut body, "unit")?;
        let value = get_value(&mut body)?;
        msg = msg.with_metric(unit, value);
    }

    if body.has_remaining() {
        return Err(ProtocolError::TrailingBytes(body.remaining()));
    }

    Ok(Some(msg))
}

// ============================================================================
// Field helpers
// ============================================================================

fn put_string(s: &str, buf: &mut BytesMut) {
    buf.put_u32_le(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

fn get_string(buf: &mut Bytes, field: &'static str) -> Result<String> {
    if buf.remaining() < 4 {
        return Err(ProtocolError::Malformed { field });
    }
    let len = buf.get_u32_le() as usize;
    if buf.remaining() < len {
        return Err(ProtocolError::Malformed { field });
    }
    let bytes = buf.split_to(len);
    String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8 { field })
}

fn get_value(buf: &mut Bytes) -> Result<MetricValue> {
    if !buf.has_remaining() {
        return Err(ProtocolError::Malformed { field: "value" });
    }
    match buf.get_u8() {
        VALUE_TAG_INT => {
            if buf.remaining() < 4 {
                return Err(ProtocolError::Malformed { field: "value" });
            }
            Ok(MetricValue::Int(buf.get_i32_le()))
        }
        VALUE_TAG_DOUBLE => {
            if buf.remaining() < 8 {
                return Err(ProtocolError::Malformed { field: "value" });
            }
            Ok(MetricValue::Double(buf.get_f64_le()))
        }
        tag => Err(ProtocolError::InvalidValueTag(tag)),
    }
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod tests;
