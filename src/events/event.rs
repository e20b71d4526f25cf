//! # Runtime events emitted by the registry, lifecycle manager, state store and event bus.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registry events**: pane types registered
//! - **Lifecycle events**: panes mounted, skipped, failed, destroyed
//! - **State events**: slices written or removed
//! - **Isolation events**: listener/subscriber panics, dropped cycles, overflow
//!
//! The [`Event`] struct carries additional metadata such as timestamps, pane id,
//! state key and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use panevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::PaneSkipped)
//!     .with_pane_type("chart")
//!     .with_reason("no factory registered");
//!
//! assert_eq!(ev.kind, EventKind::PaneSkipped);
//! assert_eq!(ev.pane_type.as_deref(), Some("chart"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::panes::PaneId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registry ===
    /// A factory was registered.
    ///
    /// Sets: `pane_type`
    PaneRegistered,

    // === Lifecycle ===
    /// A pane instance entered `mounted`.
    ///
    /// Sets: `pane`, `pane_type`, `element`
    PaneMounted,

    /// A declared container has no registered factory; it was left alone.
    ///
    /// Sets: `pane_type`, `element`, `reason`
    PaneSkipped,

    /// A factory returned an error or panicked; the container stays unmounted.
    ///
    /// Sets: `pane_type`, `element`, `reason`
    FactoryFailed,

    /// The controller's `destroy` hook failed or panicked; cleanup still happened.
    ///
    /// Sets: `pane`, `pane_type`, `reason`
    DestroyFailed,

    /// A pane instance reached `destroyed`.
    ///
    /// Sets: `pane`, `pane_type`, `element`
    PaneDestroyed,

    // === State ===
    /// A slice was written.
    ///
    /// Sets: `key`, `generation`, `pane` (writer, when written through capabilities)
    StateChanged,

    /// A slice was removed.
    ///
    /// Sets: `key`, `generation`
    StateRemoved,

    // === Isolation ===
    /// A pane-facing listener panicked during fan-out; the fan-out continued.
    ///
    /// Sets: `topic`, `reason`
    ListenerPanicked,

    /// A nested emit exceeded the configured depth and was dropped.
    ///
    /// Sets: `topic`, `reason`
    CycleDetected,

    /// A diagnostics subscriber panicked while processing an event.
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberPanicked,

    /// A diagnostics subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Pane instance involved.
    pub pane: Option<PaneId>,
    /// Pane type name involved.
    pub pane_type: Option<Arc<str>>,
    /// Container element index.
    pub element: Option<usize>,
    /// State key involved.
    pub key: Option<Arc<str>>,
    /// Write generation of the key.
    pub generation: Option<u64>,
    /// Pane-facing topic involved.
    pub topic: Option<Arc<str>>,
    /// Diagnostics subscriber name.
    pub subscriber: Option<&'static str>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            pane: None,
            pane_type: None,
            element: None,
            key: None,
            generation: None,
            topic: None,
            subscriber: None,
            reason: None,
        }
    }

    /// Attaches a pane id.
    #[inline]
    pub fn with_pane(mut self, pane: PaneId) -> Self {
        self.pane = Some(pane);
        self
    }

    /// Attaches a pane type name.
    #[inline]
    pub fn with_pane_type(mut self, pane_type: impl Into<Arc<str>>) -> Self {
        self.pane_type = Some(pane_type.into());
        self
    }

    /// Attaches a container element index.
    #[inline]
    pub fn with_element(mut self, element: usize) -> Self {
        self.element = Some(element);
        self
    }

    /// Attaches a state key.
    #[inline]
    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a write generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Attaches a pane-facing topic.
    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Arc<str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
