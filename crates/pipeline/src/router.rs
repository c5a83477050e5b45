//! Router - synchronous multi-provider fan-out
//!
//! The `Router` holds an insertion-ordered list of provider registrations,
//! each with its own threshold, plus one global threshold. `log` runs on the
//! caller's thread and visits providers in registration order.
//!
//! # Gates
//!
//! ```text
//! log(msg) ──→ global threshold ──✗──→ return Ok(0)
//!                    │
//!                    ✓
//!                    ▼
//!        ┌── lock registrations ──┐
//!        │ P1 threshold ─✓─→ P1.log(msg)
//!        │ P2 threshold ─✗
//!        │ P3 threshold ─✓─→ P3.log(msg)
//!        └── unlock ──────────────┘
//!                    │
//!                    ▼
//!        delivered hooks (exactly once)
//! ```
//!
//! One coarse lock covers registration changes and the dispatch loop, so two
//! concurrent `log` calls never interleave their deliveries to a provider and
//! `clear_providers` is strictly before or after any given dispatch.
//!
//! # Nested logging
//!
//! A provider may log back into the router it is being called from (a sink
//! reporting its own failure through `tracing` and the bridge layer). Such a
//! nested call cannot take the dispatch lock, so the message is queued and
//! delivered to every provider once the outer dispatch has finished. Messages
//! logged while those queued messages are being delivered are dropped, which
//! bounds a sink that fails on its own failure report to one extra round.

use std::cell::RefCell;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use logcast_protocol::{LevelFilter, LogMessage};

use crate::error::{PipelineError, Result};
use crate::metrics::RouterMetrics;
use crate::provider::{Provider, same_provider};

/// Callback fired once per dispatched `log` call with the number of providers
/// that received the message
pub type DeliveredHook = Arc<dyn Fn(&LogMessage, usize) + Send + Sync>;

/// One provider registration
struct Registration {
    provider: Arc<dyn Provider>,
    threshold: LevelFilter,
}

/// A router dispatching on the current thread
struct Dispatch {
    router: usize,
    /// Set once queued messages are being delivered
    draining: bool,
    /// Messages logged from inside the dispatch
    pending: Vec<LogMessage>,
}

thread_local! {
    static DISPATCHING: RefCell<Vec<Dispatch>> = const { RefCell::new(Vec::new()) };
}

/// Outcome of trying to start a dispatch
enum Entry {
    /// This call owns the dispatch
    Outer(DispatchGuard),
    /// Queued behind the running dispatch
    Deferred,
    /// Logged while queued messages were being delivered
    Dropped,
}

/// Marks a router as dispatching on the current thread until dropped
struct DispatchGuard {
    router: usize,
}

impl DispatchGuard {
    fn enter(router: &Router, message: &LogMessage) -> Entry {
        let addr = router as *const Router as usize;
        DISPATCHING.with(|active| {
            let mut active = active.borrow_mut();
            match active.iter_mut().find(|d| d.router == addr) {
                Some(dispatch) if dispatch.draining => Entry::Dropped,
                Some(dispatch) => {
                    dispatch.pending.push(message.clone());
                    Entry::Deferred
                }
                None => {
                    active.push(Dispatch {
                        router: addr,
                        draining: false,
                        pending: Vec::new(),
                    });
                    Entry::Outer(Self { router: addr })
                }
            }
        })
    }

    /// Take the queued messages; later nested calls are dropped
    fn drain(&self) -> Vec<LogMessage> {
        DISPATCHING.with(|active| {
            let mut active = active.borrow_mut();
            match active.iter_mut().find(|d| d.router == self.router) {
                Some(dispatch) => {
                    dispatch.draining = true;
                    mem::take(&mut dispatch.pending)
                }
                None => Vec::new(),
            }
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|d| d.router == self.router) {
                active.swap_remove(pos);
            }
        });
    }
}

/// Multi-provider log router
///
/// Construct one at the composition root and share it as `Arc<Router>`.
///
/// # Example
///
/// ```ignore
/// let router = Arc::new(Router::new());
/// let memory = Arc::new(MemoryProvider::new("memory"));
/// router.add_provider(memory.clone(), LevelFilter::Info);
///
/// router.log(&LogMessage::info("app", "started"))?;
/// ```
pub struct Router {
    /// Provider registrations in insertion order
    registrations: Mutex<Vec<Registration>>,

    /// Global threshold (LevelFilter ordinal)
    global: AtomicU8,

    /// Delivered notification hooks
    hooks: RwLock<Vec<DeliveredHook>>,

    /// Router metrics
    metrics: Arc<RouterMetrics>,
}

impl Router {
    /// Create a router with no providers and a `Trace` global threshold
    pub fn new() -> Self {
        Self::with_global_threshold(LevelFilter::Trace)
    }

    /// Create a router with the given global threshold
    pub fn with_global_threshold(threshold: LevelFilter) -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            global: AtomicU8::new(threshold.as_u8()),
            hooks: RwLock::new(Vec::new()),
            metrics: Arc::new(RouterMetrics::new()),
        }
    }

    /// Register a provider with its own threshold
    ///
    /// Registrations are not deduplicated: adding the same provider twice
    /// delivers every passing message to it twice.
    pub fn add_provider(&self, provider: Arc<dyn Provider>, threshold: LevelFilter) {
        debug!(
            provider = provider.name(),
            threshold = %threshold,
            "registered provider with router"
        );
        self.registrations.lock().push(Registration {
            provider,
            threshold,
        });
    }

    /// Change the threshold of a registered provider
    ///
    /// Updates the first registration of that provider instance.
    pub fn set_threshold<P>(&self, provider: &Arc<P>, threshold: LevelFilter) -> Result<()>
    where
        P: Provider + ?Sized,
    {
        {
            let mut registrations = self.registrations.lock();
            let registration = registrations
                .iter_mut()
                .find(|r| same_provider(&r.provider, provider))
                .ok_or_else(|| PipelineError::provider_not_found(provider.name()))?;
            registration.threshold = threshold;
        }

        debug!(provider = provider.name(), threshold = %threshold, "provider threshold changed");
        Ok(())
    }

    /// Get the threshold of a registered provider
    pub fn threshold<P>(&self, provider: &Arc<P>) -> Result<LevelFilter>
    where
        P: Provider + ?Sized,
    {
        self.registrations
            .lock()
            .iter()
            .find(|r| same_provider(&r.provider, provider))
            .map(|r| r.threshold)
            .ok_or_else(|| PipelineError::provider_not_found(provider.name()))
    }

    /// Remove every registration of a provider
    ///
    /// Returns how many registrations were removed.
    pub fn remove_provider<P>(&self, provider: &Arc<P>) -> Result<usize>
    where
        P: Provider + ?Sized,
    {
        let removed = {
            let mut registrations = self.registrations.lock();
            let before = registrations.len();
            registrations.retain(|r| !same_provider(&r.provider, provider));
            before - registrations.len()
        };

        if removed == 0 {
            return Err(PipelineError::provider_not_found(provider.name()));
        }

        debug!(provider = provider.name(), removed, "provider removed from router");
        Ok(removed)
    }

    /// Remove all registrations
    pub fn clear_providers(&self) {
        let removed = {
            let mut registrations = self.registrations.lock();
            let removed = registrations.len();
            registrations.clear();
            removed
        };
        debug!(removed, "cleared router providers");
    }

    /// Number of registrations
    pub fn provider_count(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Names and thresholds of all registrations, in order
    pub fn providers(&self) -> Vec<(String, LevelFilter)> {
        self.registrations
            .lock()
            .iter()
            .map(|r| (r.provider.name().to_string(), r.threshold))
            .collect()
    }

    /// Set the global threshold
    #[inline]
    pub fn set_global_threshold(&self, threshold: LevelFilter) {
        self.global.store(threshold.as_u8(), Ordering::Relaxed);
    }

    /// Get the global threshold
    #[inline]
    pub fn global_threshold(&self) -> LevelFilter {
        LevelFilter::from_u8(self.global.load(Ordering::Relaxed))
    }

    /// Register a hook fired once after every dispatched `log` call
    ///
    /// Hooks run after the dispatch lock is released, also when no provider
    /// received the message. Messages rejected by the global threshold never
    /// reach the dispatch loop and fire no hook. A hook may log into the
    /// router or register further hooks; those take effect from the next
    /// call.
    pub fn on_delivered<F>(&self, hook: F)
    where
        F: Fn(&LogMessage, usize) + Send + Sync + 'static,
    {
        self.hooks.write().push(Arc::new(hook));
    }

    /// Get the router metrics
    #[inline]
    pub fn metrics(&self) -> &RouterMetrics {
        &self.metrics
    }

    /// Get a shareable handle to the router metrics
    pub fn metrics_handle(&self) -> Arc<RouterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Route a message to every provider whose threshold it satisfies
    ///
    /// Providers run synchronously on this thread, in registration order.
    /// The first provider error is returned immediately; later providers are
    /// not visited and no hook fires.
    ///
    /// A call made from inside this router's own dispatch on the same thread
    /// returns `Ok(0)` at once; its message is delivered after the outer
    /// dispatch finishes (see the module docs).
    ///
    /// # Returns
    ///
    /// The number of providers the message was delivered to.
    pub fn log(&self, message: &LogMessage) -> Result<usize> {
        self.metrics.record_received();

        let level = message.level();
        if !self.global_threshold().allows(level) {
            self.metrics.record_filtered();
            return Ok(0);
        }

        let (delivered, deferred) = match DispatchGuard::enter(self, message) {
            Entry::Outer(guard) => {
                let delivered = self.dispatch(message)?;
                self.metrics.record_dispatch(delivered);
                trace!(level = %level, delivered, "message dispatched");

                let deferred = self.deliver_deferred(guard.drain());
                (delivered, deferred)
            }
            Entry::Deferred => {
                self.metrics.record_reentrant_deferred();
                return Ok(0);
            }
            Entry::Dropped => {
                self.metrics.record_reentrant_drop();
                return Ok(0);
            }
        };

        let hooks: Vec<DeliveredHook> = self.hooks.read().clone();
        if !hooks.is_empty() {
            let calls = std::iter::once((message, delivered))
                .chain(deferred.iter().map(|(nested, count)| (nested, *count)));
            for (message, count) in calls {
                for hook in &hooks {
                    hook(message, count);
                }
            }
        }

        Ok(delivered)
    }

    /// Deliver messages queued during a dispatch
    ///
    /// A provider error here has no caller to return to, so it is counted
    /// and the message is skipped.
    fn deliver_deferred(&self, pending: Vec<LogMessage>) -> Vec<(LogMessage, usize)> {
        let mut delivered = Vec::with_capacity(pending.len());
        for message in pending {
            match self.dispatch(&message) {
                Ok(count) => {
                    self.metrics.record_dispatch(count);
                    delivered.push((message, count));
                }
                Err(e) => debug!(error = %e, "nested message not delivered"),
            }
        }
        delivered
    }

    /// Deliver to every registration whose threshold allows the message
    fn dispatch(&self, message: &LogMessage) -> Result<usize> {
        let level = message.level();
        let registrations = self.registrations.lock();
        let mut delivered = 0;

        for registration in registrations.iter() {
            if !registration.threshold.allows(level) {
                continue;
            }

            if let Err(source) = registration.provider.log(message) {
                self.metrics.record_provider_error();
                return Err(PipelineError::Provider {
                    name: registration.provider.name().to_string(),
                    source,
                });
            }
            delivered += 1;
        }

        Ok(delivered)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("providers", &self.providers())
            .field("global_threshold", &self.global_threshold())
            .finish()
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
