//! # Revocable subscription handles.
//!
//! A [`Subscription`] is returned by every `on` call. Revoking it is idempotent:
//! the first call detaches the listener, later calls do nothing.
//!
//! Dropping a handle does **not** unsubscribe; panes routinely discard handles and
//! rely on the lifecycle manager to revoke everything they created on destroy.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::bus::Inner;

/// Identifier of one subscription, unique within its bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Handle to one (topic, listener) pair.
#[derive(Clone)]
pub struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) topic: Arc<str>,
    pub(crate) active: Arc<AtomicBool>,
    pub(crate) bus: Weak<Inner>,
}

impl Subscription {
    /// Detaches the listener. Returns `true` only for the call that actually revoked it.
    ///
    /// A listener revoked mid fan-out is not called for the rest of that fan-out.
    pub fn unsubscribe(&self) -> bool {
        if !self.active.swap(false, Ordering::AcqRel) {
            return false;
        }
        if let Some(inner) = self.bus.upgrade() {
            inner.detach(&self.topic, self.id);
        }
        true
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("active", &self.is_active())
            .finish()
    }
}
