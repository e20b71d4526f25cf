//! # Diagnostics bus.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] sender. Publishing is a plain
//! synchronous call, so the store, the pane bus and the lifecycle manager report
//! through it without an async context.
//!
//! ```text
//!   Lifecycle ──┐
//!   Store     ──┼──► Bus ──► runtime listener ──► SubscriberSet
//!   EventBus  ──┤            (only when built with subscribers)
//!   Discovery ──┘
//! ```
//!
//! Events published while nobody listens are gone. A receiver that falls more
//! than `capacity` events behind sees `RecvError::Lagged` and resumes at the oldest
//! retained event.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime diagnostics. Clones share one channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Sends `ev` to every live receiver; dropped if there is none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// New receiver; it sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(1024)
    }
}
