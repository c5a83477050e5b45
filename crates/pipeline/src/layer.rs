//! `tracing` bridge
//!
//! `RouterLayer` turns `tracing` events into [`LogMessage`]s and logs them
//! through a [`Router`]. Application code keeps using `tracing` macros, and
//! the composition root decides where those events end up by choosing the
//! router's providers.
//!
//! # Mapping
//!
//! | tracing | logcast |
//! |---------|---------|
//! | `TRACE` .. `ERROR` | `Trace` .. `Error` |
//! | event target | category |
//! | `message` field | message |
//! | other fields | appended as ` key=value` |
//!
//! Events emitted by the router itself are not forwarded.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use logcast_protocol::{LogLevel, LogMessage};

use crate::router::Router;

/// Target prefix of the router's own diagnostics
const ROUTER_TARGET: &str = "logcast_pipeline";

/// A `tracing_subscriber` layer that forwards events into a router
#[derive(Debug, Clone)]
pub struct RouterLayer {
    router: Arc<Router>,
}

impl RouterLayer {
    /// Create a layer forwarding into `router`
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }
}

/// Map a tracing level onto a logcast level
pub fn level_from_tracing(level: &Level) -> LogLevel {
    match *level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

/// Build a message from a tracing event
pub fn message_from_event(event: &Event<'_>) -> LogMessage {
    let metadata = event.metadata();
    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);

    LogMessage::new(
        level_from_tracing(metadata.level()),
        metadata.target(),
        visitor.finish(),
    )
}

impl<S: Subscriber> Layer<S> for RouterLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target().starts_with(ROUTER_TARGET) {
            return;
        }

        let message = message_from_event(event);

        // Provider errors have nowhere to go from inside a subscriber
        let _ = self.router.log(&message);
    }
}

/// Collects the `message` field and renders the rest as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            self.message + &self.fields
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
#[path = "layer_test.rs"]
mod tests;
