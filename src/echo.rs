//! # Echo suppression.
//!
//! When a pane writes slice `K` and also listens to `K`, the notification for its
//! own write would make it rebuild the UI it just rendered (and lose input focus).
//! [`EchoGuard`] lets the pane tell "I just wrote this" from "someone else did".
//!
//! Each pane instance owns one guard. On every write through the pane's
//! capabilities the store reports the write's [`Generation`]; the guard arms
//! `(key, generation)` before any listener runs and disarms it when the fan-out
//! of that write has finished. A notification is an echo iff its `(key,
//! generation)` is armed. Writes nest: a pane that writes again while its first
//! write is still fanning out has both generations armed, so the tail of the
//! first fan-out stays suppressed too.
//!
//! ```text
//! pane A: set(N)  → arm (N, 4) → notify { N, gen 4 }
//!                                  ├─ A listener: echo, swallowed
//!                                  └─ B listener: delivered
//!                 ← disarm (N, 4)
//! external: set(N) → notify { N, gen 5 }
//!                                  ├─ A listener: delivered (nothing armed)
//!                                  └─ B listener: delivered
//! ```
//!
//! The guard is strictly local: it only filters listeners registered through the
//! same instance, and it holds no timer, so it can never stay armed.

use std::sync::{Arc, Mutex};

use crate::pubsub::{Change, Message};
use crate::state::Generation;
use crate::sync::lock;

/// Per-instance set of writes whose fan-out is still running.
#[derive(Debug, Default)]
pub struct EchoGuard {
    in_flight: Mutex<Vec<(Arc<str>, Generation)>>,
}

/// Keeps one write armed until dropped.
#[must_use = "the write is disarmed as soon as this is dropped"]
pub struct Armed<'a> {
    guard: &'a EchoGuard,
    key: Arc<str>,
    generation: Generation,
}

impl EchoGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `generation` of `key` as this instance's own write.
    pub fn arm(&self, key: &str, generation: Generation) -> Armed<'_> {
        let key: Arc<str> = Arc::from(key);
        lock(&self.in_flight).push((Arc::clone(&key), generation));
        Armed {
            guard: self,
            key,
            generation,
        }
    }

    /// `true` if `change` is the notification of a write this instance has armed.
    pub fn is_echo(&self, change: &Change) -> bool {
        lock(&self.in_flight)
            .iter()
            .any(|(k, g)| *g == change.generation && **k == *change.key)
    }

    /// `true` if `msg` is a state notification that [`is_echo`](Self::is_echo).
    #[inline]
    pub fn suppresses(&self, msg: &Message) -> bool {
        msg.change.as_ref().is_some_and(|c| self.is_echo(c))
    }
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        let mut in_flight = lock(&self.guard.in_flight);
        if let Some(pos) = in_flight
            .iter()
            .position(|(k, g)| *g == self.generation && *k == self.key)
        {
            in_flight.swap_remove(pos);
        }
    }
}
