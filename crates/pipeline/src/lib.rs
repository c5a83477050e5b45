//! Logcast - Pipeline
//!
//! The synchronous router that fans completed messages out to providers.
//!
//! # Architecture
//!
//! ```text
//! [Producers]                 [Router]                      [Providers]
//!   app code ──┐                                        ┌──→ Console
//!   tracing ───┼──→ log(msg) ──→ global ──→ per-provider ┼──→ File
//!   emit CLI ──┘               threshold    thresholds   └──→ Broadcast ──→ listeners
//! ```
//!
//! # Key Design
//!
//! - **Caller's thread**: `log` delivers inline, there is no queue or worker
//! - **Two gates**: a global threshold, then each registration's own threshold
//! - **Ordered**: providers are visited in registration order, and one lock
//!   keeps concurrent calls from interleaving at any provider
//! - **Re-entrancy safe**: a provider that logs back into the router from its
//!   own `log` is dropped instead of deadlocking
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use logcast_pipeline::Router;
//! use logcast_protocol::{LevelFilter, LogMessage};
//!
//! let router = Arc::new(Router::new());
//! router.add_provider(console, LevelFilter::Info);
//! router.add_provider(broadcast, LevelFilter::Error);
//!
//! router.log(&LogMessage::warn("disk", "80% full"))?; // console only
//! ```

mod error;
mod layer;
mod metrics;
mod provider;
mod router;

pub use error::{PipelineError, ProviderError, Result};
pub use layer::{RouterLayer, level_from_tracing, message_from_event};
pub use metrics::{MetricsSnapshot, RouterMetrics};
pub use provider::{Provider, same_provider};
pub use router::{DeliveredHook, Router};
