//! Broadcast server
//!
//! `BroadcastServer` is a [`Provider`] that re-emits every routed message, as
//! one frame, to every listener connected to its channel's Unix socket.
//!
//! # Tasks
//!
//! ```text
//! Provider::log ──→ encode ──→ try_send ──→ [server queue] ──→ writer task
//!                                                                  │
//!                                                            try_send each
//!                                                                  ▼
//!                   accept task ──add──→ [listener queue] ──→ listener task ──→ socket
//!                                        [listener queue] ──→ listener task ──→ socket
//! ```
//!
//! `log` never waits on a socket: a full server queue drops the frame. The
//! writer task is the only consumer of the server queue and feeds every
//! listener's queue in the same order, so each listener sees frames in send
//! order. Each listener has its own write task, so one that stops reading
//! only fills its own queue; when that queue is full the listener is
//! disconnected. A listener whose write fails is removed; the others are
//! unaffected.
//!
//! There is no replay for late listeners, no acknowledgement, and no write
//! timeout.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use logcast_pipeline::{Provider, ProviderError};
use logcast_protocol::{LogMessage, encode};

use crate::channel::Channel;
use crate::error::{Result, TapError};
use crate::listener::{Listeners, Outgoing, Registered};

/// Default capacity of the server frame queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default capacity of each listener's frame queue
pub const DEFAULT_LISTENER_QUEUE_CAPACITY: usize = 256;

/// Minimum time between two "queue full" warnings
const DROP_WARN_INTERVAL: Duration = Duration::from_secs(1);

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Server configuration
#[derive(Debug, Clone)]
pub struct BroadcastServerConfig {
    /// Channel to listen on
    pub channel: Channel,
    /// Frames that may wait for the writer before new ones are dropped
    pub queue_capacity: usize,
    /// Frames a listener may fall behind before it is disconnected
    pub listener_queue_capacity: usize,
}

impl Default for BroadcastServerConfig {
    fn default() -> Self {
        Self {
            channel: Channel::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            listener_queue_capacity: DEFAULT_LISTENER_QUEUE_CAPACITY,
        }
    }
}

impl BroadcastServerConfig {
    /// Create config for a channel with the default queue capacity
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            ..Self::default()
        }
    }

    /// Set the queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the per-listener queue capacity
    pub fn with_listener_queue_capacity(mut self, capacity: usize) -> Self {
        self.listener_queue_capacity = capacity;
        self
    }
}

/// Server counters
#[derive(Debug, Default)]
pub struct ServerStats {
    frames_queued: AtomicU64,
    frames_dropped: AtomicU64,
    frames_oversized: AtomicU64,
    frames_written: AtomicU64,
    connections_accepted: AtomicU64,
    connections_closed: AtomicU64,
    connections_lagged: AtomicU64,
}

impl ServerStats {
    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_queued: self.frames_queued.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_oversized: self.frames_oversized.load(Ordering::Relaxed),
            frames_written: self.frames_written.load(Ordering::Relaxed),
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            connections_lagged: self.connections_lagged.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of server counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Frames accepted into the queue
    pub frames_queued: u64,
    /// Frames dropped because the queue was full or closed
    pub frames_dropped: u64,
    /// Messages refused because their frame would exceed `MAX_FRAME_LEN`
    pub frames_oversized: u64,
    /// Frames handed to every connected listener's queue
    pub frames_written: u64,
    /// Listeners accepted
    pub connections_accepted: u64,
    /// Listeners removed after a failed write
    pub connections_closed: u64,
    /// Listeners disconnected because their queue was full
    pub connections_lagged: u64,
}

/// Work for the writer task
enum Command {
    Frame(Bytes),
    Flush(oneshot::Sender<()>),
}

/// Unix socket broadcast provider
///
/// Created with [`BroadcastServer::bind`] inside a tokio runtime and
/// registered with a router like any other provider.
pub struct BroadcastServer {
    name: String,
    channel: Channel,
    socket_path: PathBuf,
    queue: mpsc::Sender<Command>,
    listeners: Arc<Listeners>,
    stats: Arc<ServerStats>,
    cancel: CancellationToken,
    last_drop_warning: parking_lot::Mutex<Option<Instant>>,
}

impl BroadcastServer {
    /// Bind the channel's socket and start the accept and writer tasks
    ///
    /// A stale socket file left behind by an earlier server is removed
    /// first.
    pub async fn bind(config: BroadcastServerConfig) -> Result<Self> {
        if config.queue_capacity == 0 {
            return Err(TapError::InvalidConfig(
                "queue capacity must be greater than 0".into(),
            ));
        }
        if config.listener_queue_capacity == 0 {
            return Err(TapError::InvalidConfig(
                "listener queue capacity must be greater than 0".into(),
            ));
        }

        let socket_path = config.channel.socket_path();
        remove_stale_socket(&socket_path)?;

        let listener = UnixListener::bind(&socket_path)?;
        info!(
            channel = %config.channel,
            path = %socket_path.display(),
            "broadcast server listening"
        );

        let (queue, commands) = mpsc::channel(config.queue_capacity);
        let listeners = Arc::new(Listeners::new());
        let stats = Arc::new(ServerStats::default());
        let cancel = CancellationToken::new();

        tokio::spawn(accept_loop(
            listener,
            config.listener_queue_capacity,
            Arc::clone(&listeners),
            Arc::clone(&stats),
            cancel.clone(),
        ));
        tokio::spawn(writer_loop(
            commands,
            Arc::clone(&listeners),
            Arc::clone(&stats),
            cancel.clone(),
        ));

        Ok(Self {
            name: format!("broadcast:{}", config.channel),
            channel: config.channel,
            socket_path,
            queue,
            listeners,
            stats,
            cancel,
            last_drop_warning: parking_lot::Mutex::new(None),
        })
    }

    /// Queue a message for every connected listener
    ///
    /// Encodes once and never blocks. Returns `false` if the frame was
    /// dropped because the queue is full or the server is shut down, or
    /// refused because it would be larger than listeners accept.
    pub fn send_message(&self, message: &LogMessage) -> bool {
        let frame = match encode(message) {
            Ok(frame) => frame,
            Err(e) => {
                let refused = self.stats.frames_oversized.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    channel = %self.channel,
                    error = %e,
                    refused,
                    "message too large to broadcast, dropped"
                );
                return false;
            }
        };

        match self.queue.try_send(Command::Frame(frame)) {
            Ok(()) => {
                self.stats.frames_queued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                let dropped = self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed) + 1;
                self.warn_dropped(dropped);
                false
            }
        }
    }

    /// Wait until every frame queued so far has been written
    ///
    /// A listener that stays connected but stops reading holds the flush
    /// until it reads, disconnects, or falls far enough behind to be
    /// dropped. Callers that must not wait indefinitely wrap this in a
    /// timeout.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.queue.send(Command::Flush(done)).await.is_ok() {
            let _ = wait.await;
        }
    }

    /// Number of connected listeners
    #[inline]
    pub fn connection_count(&self) -> usize {
        self.listeners.count()
    }

    /// Get a point-in-time copy of the server counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// The channel this server broadcasts on
    #[inline]
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Path of the listening socket
    #[inline]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Stop both tasks, drop every listener, and remove the socket file
    ///
    /// Frames still in the queue are discarded; call [`flush`](Self::flush)
    /// first to deliver them.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let dropped = self.listeners.clear();

        if let Err(e) = std::fs::remove_file(&self.socket_path)
            && e.kind() != ErrorKind::NotFound
        {
            warn!(path = %self.socket_path.display(), error = %e, "failed to remove socket file");
        }

        info!(channel = %self.channel, listeners = dropped, "broadcast server stopped");
    }

    fn warn_dropped(&self, dropped: u64) {
        let now = Instant::now();
        let mut last = self.last_drop_warning.lock();
        let due = last.is_none_or(|at| now.duration_since(at) >= DROP_WARN_INTERVAL);
        if due {
            *last = Some(now);
            drop(last);
            warn!(channel = %self.channel, dropped, "broadcast queue full, dropping frames");
        }
    }
}

impl Provider for BroadcastServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, message: &LogMessage) -> std::result::Result<(), ProviderError> {
        self.send_message(message);
        Ok(())
    }
}

impl Drop for BroadcastServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for BroadcastServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastServer")
            .field("channel", &self.channel)
            .field("socket_path", &self.socket_path)
            .field("connections", &self.connection_count())
            .finish()
    }
}

/// Remove a socket file left behind by an earlier server
fn remove_stale_socket(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale socket file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TapError::Io(e)),
    }
}

/// Accept listeners until cancelled
async fn accept_loop(
    listener: UnixListener,
    queue_capacity: usize,
    listeners: Arc<Listeners>,
    stats: Arc<ServerStats>,
    cancel: CancellationToken,
) {
    loop {
        let accepted = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, _addr)) => {
                let registered = listeners.add(queue_capacity, &cancel);
                stats.connections_accepted.fetch_add(1, Ordering::Relaxed);
                debug!(connection = registered.id, open = listeners.count(), "listener connected");

                tokio::spawn(listener_loop(
                    stream,
                    registered,
                    Arc::clone(&listeners),
                    Arc::clone(&stats),
                ));
            }
            Err(e) => {
                error!(error = %e, "failed to accept listener");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }

    debug!("accept task stopped");
}

/// Fan queued frames out to every listener until cancelled
async fn writer_loop(
    mut commands: mpsc::Receiver<Command>,
    listeners: Arc<Listeners>,
    stats: Arc<ServerStats>,
    cancel: CancellationToken,
) {
    loop {
        let command = tokio::select! {
            _ = cancel.cancelled() => break,
            command = commands.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            Command::Frame(frame) => {
                let lagged = listeners.broadcast(&frame);
                record_lagged(&stats, &lagged);
                stats.frames_written.fetch_add(1, Ordering::Relaxed);
            }
            Command::Flush(done) => {
                let (waiters, lagged) = listeners.flush();
                record_lagged(&stats, &lagged);
                tokio::spawn(async move {
                    for waiter in waiters {
                        let _ = waiter.await;
                    }
                    let _ = done.send(());
                });
            }
        }
    }

    debug!("writer task stopped");
}

fn record_lagged(stats: &ServerStats, lagged: &[u64]) {
    if lagged.is_empty() {
        return;
    }
    stats
        .connections_lagged
        .fetch_add(lagged.len() as u64, Ordering::Relaxed);
    warn!(connections = ?lagged, "listener fell behind, disconnected");
}

/// Write one listener's frames to its socket until it fails or is cancelled
async fn listener_loop(
    mut stream: UnixStream,
    registered: Registered,
    listeners: Arc<Listeners>,
    stats: Arc<ServerStats>,
) {
    let Registered {
        id,
        mut frames,
        cancel,
    } = registered;

    loop {
        let outgoing = tokio::select! {
            _ = cancel.cancelled() => break,
            outgoing = frames.recv() => match outgoing {
                Some(outgoing) => outgoing,
                None => break,
            },
        };

        let frame = match outgoing {
            Outgoing::Frame(frame) => frame,
            Outgoing::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        };

        let written = tokio::select! {
            _ = cancel.cancelled() => break,
            written = stream.write_all(&frame) => written,
        };

        if let Err(e) = written {
            if listeners.remove(id) {
                stats.connections_closed.fetch_add(1, Ordering::Relaxed);
            }
            debug!(connection = id, error = %e, "listener closed");
            break;
        }
    }

    debug!(connection = id, "listener task stopped");
}

#[cfg(test)]
#[path = "server_test.rs"]
mod tests;
