//! Logcast Tap - Broadcast transport over Unix sockets (Unix only)
//!
//! A [`BroadcastServer`] is a router provider that re-emits every message it
//! receives to all listeners connected to its channel. A [`TapClient`] is
//! one such listener.
//!
//! - Frames are encoded once and fanned out by a single writer task
//! - Logging never waits on a listener; a full queue drops frames
//! - Each listener is written by its own task, so a stalled one only
//!   delays itself; once its queue fills it is disconnected
//! - A listener that goes away is removed without affecting the others
//! - Late listeners get no replay
//!
//! **Note:** This crate only compiles on Unix platforms (Linux, macOS) as it
//! uses Unix domain sockets for IPC.
//!
//! # Architecture
//!
//! ```text
//! Router.log()
//!     │
//!     ├──→ Console / File
//!     │
//!     └──→ BroadcastServer ──→ queue ──→ writer task
//!                                             │
//!                              ┌──────────────┼──────────────┐
//!                              ▼              ▼              ▼
//!                        listener task  listener task  listener task
//!                              │              │              │
//!                              ▼              ▼              ▼
//!                          TapClient      TapClient      TapClient
//! ```

#[cfg(unix)]
pub mod channel;
#[cfg(unix)]
pub mod client;
#[cfg(unix)]
mod error;
#[cfg(unix)]
mod listener;
#[cfg(unix)]
pub mod server;

#[cfg(unix)]
pub use channel::{Channel, DEFAULT_CHANNEL};
#[cfg(unix)]
pub use client::TapClient;
#[cfg(unix)]
pub use error::{Result, TapError};
#[cfg(unix)]
pub use server::{
    BroadcastServer, BroadcastServerConfig, DEFAULT_LISTENER_QUEUE_CAPACITY,
    DEFAULT_QUEUE_CAPACITY, ServerStats, StatsSnapshot,
};
