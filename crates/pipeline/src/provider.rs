//! Provider contract
//!
//! A provider (sink) accepts a completed message and performs one side
//! effect: print it, append it to a file, store it, or re-transmit it.
//! The router only ever calls [`Provider::log`].

use std::sync::Arc;

use logcast_protocol::LogMessage;

use crate::error::ProviderError;

/// A destination for routed messages
///
/// `log` runs synchronously on the thread that called `Router::log`, while
/// the router holds its dispatch lock. Implementations must not block for
/// long and must not fail for ordinary operating conditions; transient
/// trouble is theirs to retry or swallow.
pub trait Provider: Send + Sync {
    /// Name used in diagnostics and errors
    fn name(&self) -> &str;

    /// Handle one message
    fn log(&self, message: &LogMessage) -> Result<(), ProviderError>;
}

/// Check whether two handles point at the same provider instance
#[inline]
pub fn same_provider<A, B>(a: &Arc<A>, b: &Arc<B>) -> bool
where
    A: Provider + ?Sized,
    B: Provider + ?Sized,
{
    // Compare data pointers only; vtable pointers may differ across codegen units
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
