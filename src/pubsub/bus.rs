//! # Synchronous topic fan-out for panes.
//!
//! [`EventBus`] delivers a [`Message`] to every listener subscribed to its topic,
//! in subscription order, before `emit` returns.
//!
//! ## Architecture
//! ```text
//! emit(topic, payload)
//!     │
//!     ├─► depth check (nested emits beyond max_depth → CycleDetected, dropped)
//!     ├─► snapshot listeners of `topic` (lock released before any call)
//!     └─► for each listener in FIFO order:
//!            ├─ revoked since the snapshot? skip
//!            └─ call; panic caught → ListenerPanicked, continue
//! ```
//!
//! ## Rules
//! - **Snapshot**: listeners added during a fan-out do not see the in-flight message.
//! - **Revocation wins**: a listener revoked during a fan-out is not called afterwards.
//! - **Isolation**: a panicking listener never aborts the remaining fan-out.
//! - **Reentrancy**: listeners may `emit`/`on`/`unsubscribe` freely; no lock is held
//!   while a listener runs.
//! - **No cancellation**: a slow listener delays every listener after it.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::message::Message;
use super::subscription::{Subscription, SubscriptionId};
use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::sync::lock;

/// Listener callback.
pub type Listener = Arc<dyn Fn(&Message) + Send + Sync>;

struct Entry {
    id: SubscriptionId,
    active: Arc<AtomicBool>,
    listener: Listener,
}

pub(crate) struct Inner {
    topics: Mutex<HashMap<Arc<str>, Vec<Entry>>>,
    next_id: AtomicU64,
    depth: AtomicUsize,
    max_depth: Option<usize>,
    diagnostics: Bus,
}

impl Inner {
    pub(crate) fn detach(&self, topic: &str, id: SubscriptionId) {
        let mut topics = lock(&self.topics);
        if let Some(entries) = topics.get_mut(topic) {
            entries.retain(|e| e.id != id);
            if entries.is_empty() {
                topics.remove(topic);
            }
        }
    }
}

/// Decrements the nesting depth when a fan-out unwinds or returns.
struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Topic-keyed synchronous publish/subscribe.
///
/// Cheap to clone; clones share subscribers.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    /// Creates a bus that reports isolation events to `diagnostics`.
    ///
    /// `max_depth` bounds nested emits (a listener emitting while being notified);
    /// `None` leaves them unbounded.
    pub fn new(max_depth: Option<usize>, diagnostics: Bus) -> Self {
        Self {
            inner: Arc::new(Inner {
                topics: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                depth: AtomicUsize::new(0),
                max_depth,
                diagnostics,
            }),
        }
    }

    /// Subscribes `listener` to exactly `topic`.
    pub fn on(&self, topic: &str, listener: Listener) -> Subscription {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let topic: Arc<str> = Arc::from(topic);
        let active = Arc::new(AtomicBool::new(true));

        lock(&self.inner.topics)
            .entry(Arc::clone(&topic))
            .or_default()
            .push(Entry {
                id,
                active: Arc::clone(&active),
                listener,
            });

        Subscription {
            id,
            topic,
            active,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Same as [`Subscription::unsubscribe`].
    #[inline]
    pub fn off(&self, subscription: &Subscription) -> bool {
        subscription.unsubscribe()
    }

    /// Emits an application event.
    pub fn emit(&self, topic: &str, payload: Value) {
        self.publish(Message::new(topic, payload));
    }

    /// Delivers `msg` to the listeners of `msg.topic`.
    pub fn publish(&self, msg: Message) {
        let depth = self.inner.depth.fetch_add(1, Ordering::AcqRel) + 1;
        let _guard = DepthGuard(&self.inner.depth);

        if let Some(max) = self.inner.max_depth.filter(|max| depth > *max) {
            tracing::warn!(topic = %msg.topic, depth, "emit depth exceeded; message dropped");
            self.inner.diagnostics.publish(
                Event::new(EventKind::CycleDetected)
                    .with_topic(Arc::clone(&msg.topic))
                    .with_reason(format!("depth {depth} > {max}")),
            );
            return;
        }

        let snapshot: Vec<(Arc<AtomicBool>, Listener)> = {
            let topics = lock(&self.inner.topics);
            match topics.get(msg.topic.as_ref()) {
                Some(entries) => entries
                    .iter()
                    .map(|e| (Arc::clone(&e.active), Arc::clone(&e.listener)))
                    .collect(),
                None => return,
            }
        };

        for (active, listener) in snapshot {
            if !active.load(Ordering::Acquire) {
                continue;
            }
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(&msg))) {
                let info = panic_message(&*payload);
                tracing::warn!(topic = %msg.topic, %info, "listener panicked");
                self.inner.diagnostics.publish(
                    Event::new(EventKind::ListenerPanicked)
                        .with_topic(Arc::clone(&msg.topic))
                        .with_reason(info),
                );
            }
        }
    }

    /// Number of live listeners on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        lock(&self.inner.topics).get(topic).map_or(0, Vec::len)
    }

    /// Topics that currently have at least one listener, sorted.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = lock(&self.inner.topics)
            .keys()
            .map(|t| t.to_string())
            .collect();
        topics.sort_unstable();
        topics
    }
}
