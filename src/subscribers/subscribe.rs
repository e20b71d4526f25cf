//! # Diagnostics subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom handlers into the
//! runtime's diagnostics stream (mounts, failures, state changes, cycles). Each
//! subscriber is driven by a dedicated worker task fed by a bounded queue owned by
//! the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they never block pane code nor other subscribers.
//! - Each subscriber declares its queue capacity via [`Subscribe::queue_capacity`].
//!   On overflow, events for that subscriber are dropped and `SubscriberOverflow`
//!   is published.
//!
//! ## Example
//! ```rust
//! use panevisor::{Event, EventKind, Subscribe};
//!
//! struct Failures;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Failures {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::FactoryFailed {
//!             // page an operator...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for diagnostics subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
