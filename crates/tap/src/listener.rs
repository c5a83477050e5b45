//! Listener registry
//!
//! Every accepted connection gets a bounded queue of outgoing frames and its
//! own write task. The registry lock only ever covers non-blocking work:
//! fan-out is a `try_send` into each queue, so a listener whose socket is
//! full never holds up the others, the accept loop, or shutdown.
//!
//! A listener whose queue is full has fallen too far behind and is removed.
//! Removing a listener cancels its token, which stops its write task and
//! closes the socket.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Work for a listener's write task
#[derive(Debug)]
pub(crate) enum Outgoing {
    /// Bytes to write as-is
    Frame(Bytes),
    /// Signalled once every earlier frame has been written
    Flush(oneshot::Sender<()>),
}

/// Handles for a newly registered listener
#[derive(Debug)]
pub(crate) struct Registered {
    pub id: u64,
    pub frames: mpsc::Receiver<Outgoing>,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
struct Listener {
    id: u64,
    queue: mpsc::Sender<Outgoing>,
    cancel: CancellationToken,
}

/// All connected listeners of one server
#[derive(Debug, Default)]
pub(crate) struct Listeners {
    listeners: Mutex<Vec<Listener>>,
    next_id: AtomicU64,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener with a queue of `capacity` frames
    ///
    /// The returned token is a child of `parent`, so cancelling the server
    /// stops every listener.
    pub fn add(&self, capacity: usize, parent: &CancellationToken) -> Registered {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (queue, frames) = mpsc::channel(capacity);
        let cancel = parent.child_token();

        self.listeners.lock().push(Listener {
            id,
            queue,
            cancel: cancel.clone(),
        });

        Registered { id, frames, cancel }
    }

    /// Remove a listener and stop its write task
    ///
    /// Returns `false` if it was already gone.
    pub fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.lock();
        match listeners.iter().position(|l| l.id == id) {
            Some(pos) => {
                listeners.swap_remove(pos).cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Remove every listener; returns how many there were
    pub fn clear(&self) -> usize {
        let mut listeners = self.listeners.lock();
        for listener in listeners.iter() {
            listener.cancel.cancel();
        }
        let cleared = listeners.len();
        listeners.clear();
        cleared
    }

    pub fn count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Queue a frame for every listener
    ///
    /// Returns the ids of listeners removed because their queue was full
    /// or their write task had already stopped.
    pub fn broadcast(&self, frame: &Bytes) -> Vec<u64> {
        self.offer(|| Outgoing::Frame(frame.clone()))
    }

    /// Queue a flush marker for every listener
    ///
    /// Returns one receiver per listener that accepted the marker, and the
    /// ids of listeners removed like in [`broadcast`](Self::broadcast).
    pub fn flush(&self) -> (Vec<oneshot::Receiver<()>>, Vec<u64>) {
        let mut waiters = Vec::new();
        let removed = self.offer(|| {
            let (done, wait) = oneshot::channel();
            waiters.push(wait);
            Outgoing::Flush(done)
        });
        (waiters, removed)
    }

    fn offer(&self, mut item: impl FnMut() -> Outgoing) -> Vec<u64> {
        let mut listeners = self.listeners.lock();
        let mut removed = Vec::new();

        listeners.retain(|listener| {
            if listener.queue.try_send(item()).is_ok() {
                return true;
            }
            listener.cancel.cancel();
            removed.push(listener.id);
            false
        });

        removed
    }
}

#[cfg(test)]
#[path = "listener_test.rs"]
mod tests;
