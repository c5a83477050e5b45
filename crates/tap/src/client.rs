//! Broadcast client
//!
//! `TapClient` connects to a broadcast server's channel and decodes the
//! frame stream back into messages. Frames of unknown kind and frames whose
//! body doesn't decode are skipped; the stream stays aligned on the next
//! frame either way.

use tokio::net::UnixStream;
use tracing::debug;

use logcast_protocol::{Frame, FrameReader, LogMessage, ProtocolError};

use crate::channel::Channel;
use crate::error::Result;

/// A listener connected to one channel
#[derive(Debug)]
pub struct TapClient {
    channel: Channel,
    reader: FrameReader<UnixStream>,
    skipped: u64,
}

impl TapClient {
    /// Connect to the server broadcasting on `channel`
    pub async fn connect(channel: &Channel) -> Result<Self> {
        let path = channel.socket_path();
        let stream = UnixStream::connect(&path).await?;
        debug!(channel = %channel, path = %path.display(), "connected to broadcast server");

        Ok(Self {
            channel: channel.clone(),
            reader: FrameReader::new(stream),
            skipped: 0,
        })
    }

    /// Receive the next message
    ///
    /// Returns `Ok(None)` once the server goes away. A frame cut short by the
    /// server closing mid-write also counts as end of stream.
    pub async fn recv(&mut self) -> Result<Option<LogMessage>> {
        loop {
            match self.reader.next_frame().await {
                Ok(Some(Frame::Message(message))) => return Ok(Some(message)),
                Ok(Some(Frame::Skipped { .. })) => self.skipped += 1,
                Ok(None) => return Ok(None),
                Err(ProtocolError::Truncated { expected, actual }) => {
                    debug!(expected, actual, "stream ended inside a frame");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Feed every message to `f` until the stream ends
    ///
    /// Returns the number of messages seen.
    pub async fn for_each<F>(&mut self, mut f: F) -> Result<u64>
    where
        F: FnMut(LogMessage),
    {
        let mut seen = 0;
        while let Some(message) = self.recv().await? {
            f(message);
            seen += 1;
        }
        Ok(seen)
    }

    /// The channel this client listens on
    #[inline]
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Frames skipped so far
    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}
