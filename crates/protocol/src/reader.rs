//! Stream-oriented frame decoding
//!
//! `FrameReader` pulls frames off any `AsyncRead`. A single read on a socket
//! or pipe may return fewer bytes than asked for, so every fixed-size read
//! loops until the buffer is full, and a zero-byte read is end-of-stream.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use crate::codec::{HEADER_LEN, decode_body, decode_header};
use crate::error::ProtocolError;
use crate::message::LogMessage;
use crate::Result;

/// One frame read off a stream
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A decoded message
    Message(LogMessage),
    /// A complete frame that was consumed but not decoded (unknown kind or
    /// malformed body). The stream is still aligned on the next frame.
    Skipped { kind: u16, len: usize },
}

/// Reads frames from an async byte stream
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Wrap a byte stream
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read the next frame
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between frames. End of
    /// stream in the middle of a frame is [`ProtocolError::Truncated`]. A
    /// header announcing more than `MAX_FRAME_LEN` bytes is
    /// [`ProtocolError::FrameTooLarge`] whatever its kind.
    pub async fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut header = [0u8; HEADER_LEN];

        // The first byte decides between a clean end and a truncated header
        let first = self.inner.read(&mut header[..1]).await?;
        if first == 0 {
            return Ok(None);
        }
        self.fill(&mut header[1..], 1).await?;

        let (kind, len) = decode_header(header)?;

        let mut body = BytesMut::zeroed(len);
        self.fill(&mut body[..], 0).await?;

        match decode_body(kind, body.freeze()) {
            Ok(Some(message)) => Ok(Some(Frame::Message(message))),
            Ok(None) => {
                trace!(kind, len, "skipping frame of unknown kind");
                Ok(Some(Frame::Skipped { kind, len }))
            }
            Err(e) if e.is_recoverable() => {
                debug!(kind, len, error = %e, "skipping malformed frame");
                Ok(Some(Frame::Skipped { kind, len }))
            }
            Err(e) => Err(e),
        }
    }

    /// Read the next message, skipping frames that don't decode
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    pub async fn next_message(&mut self) -> Result<Option<LogMessage>> {
        loop {
            match self.next_frame().await? {
                Some(Frame::Message(message)) => return Ok(Some(message)),
                Some(Frame::Skipped { .. }) => continue,
                None => return Ok(None),
            }
        }
    }

    /// Get a reference to the underlying stream
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the reader, returning the underlying stream
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fill `buf` completely
    ///
    /// `offset` bytes of the same header or body were read before `buf`, so
    /// a truncation reports sizes for the whole field.
    async fn fill(&mut self, buf: &mut [u8], offset: usize) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.inner.read(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(ProtocolError::truncated(
                    offset + buf.len(),
                    offset + filled,
                ));
            }
            filled += n;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod tests;
