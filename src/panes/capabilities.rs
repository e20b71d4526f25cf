//! # Capabilities handed to pane factories.
//!
//! A pane sees exactly two things: state access and event access. Both are traits,
//! so tests can hand a factory a double instead of a live runtime.
//!
//! The runtime's implementation ([`ScopedCapabilities`]) is scoped to one pane
//! instance:
//! - every write is stamped with the instance's [`PaneId`] and armed in its
//!   [`EchoGuard`] while listeners run;
//! - every listener registered through it skips notifications of the instance's
//!   own writes (see [`echo`](crate::echo));
//! - every subscription is tracked and revoked when the instance is destroyed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::pane::PaneId;
use crate::echo::EchoGuard;
use crate::pubsub::{key_topic, EventBus, Listener, Message, Subscription};
use crate::state::{Generation, StateStore};
use crate::sync::lock;

/// Read/write access to state slices.
pub trait StateAccess: Send + Sync {
    /// Reads `key` (registered default or empty object when absent).
    fn get(&self, key: &str) -> Value;

    /// Reads `key`, materializing `default()` when absent.
    fn get_or(&self, key: &str, default: &dyn Fn() -> Value) -> Value;

    /// Replaces the whole slice.
    fn set(&self, key: &str, value: Value) -> Generation;

    /// Read-modify-write of the whole slice.
    fn update(&self, key: &str, f: &mut dyn FnMut(&mut Value)) -> Generation {
        let mut value = self.get(key);
        f(&mut value);
        self.set(key, value)
    }
}

/// Subscribe/emit access to the pane event bus.
pub trait EventAccess: Send + Sync {
    fn on(&self, topic: &str, listener: Listener) -> Subscription;

    /// Idempotent; same as [`Subscription::unsubscribe`].
    fn off(&self, subscription: &Subscription) -> bool {
        subscription.unsubscribe()
    }

    fn emit(&self, topic: &str, payload: Value);
}

/// Closure-friendly helpers over [`EventAccess`].
pub trait EventAccessExt: EventAccess {
    /// Subscribes a closure to `topic`.
    fn subscribe<F>(&self, topic: &str, f: F) -> Subscription
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(topic, Arc::new(f))
    }

    /// Subscribes a closure to changes of `key` only.
    fn on_key<F>(&self, key: &str, f: F) -> Subscription
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&key_topic(key), Arc::new(f))
    }
}

impl<T: EventAccess + ?Sized> EventAccessExt for T {}

/// Everything a pane may touch.
pub trait Capabilities: Send + Sync {
    fn state(&self) -> &dyn StateAccess;
    fn events(&self) -> &dyn EventAccess;
}

/// Capabilities of one live pane instance.
pub(crate) struct ScopedCapabilities {
    pane: PaneId,
    store: Arc<StateStore>,
    bus: EventBus,
    echo: Arc<EchoGuard>,
    owned: Mutex<Vec<Subscription>>,
    revoked: AtomicBool,
}

impl ScopedCapabilities {
    pub(crate) fn new(pane: PaneId, store: Arc<StateStore>, bus: EventBus) -> Self {
        Self {
            pane,
            store,
            bus,
            echo: Arc::new(EchoGuard::new()),
            owned: Mutex::new(Vec::new()),
            revoked: AtomicBool::new(false),
        }
    }

    /// Revokes every subscription this instance created. Later `on` calls yield
    /// already-revoked handles. Returns how many subscriptions were still live.
    pub(crate) fn revoke(&self) -> usize {
        self.revoked.store(true, Ordering::Release);
        let owned: Vec<Subscription> = lock(&self.owned).drain(..).collect();
        owned.iter().filter(|s| s.unsubscribe()).count()
    }

    pub(crate) fn live_subscriptions(&self) -> usize {
        lock(&self.owned).iter().filter(|s| s.is_active()).count()
    }
}

impl StateAccess for ScopedCapabilities {
    fn get(&self, key: &str) -> Value {
        self.store.get(key)
    }

    fn get_or(&self, key: &str, default: &dyn Fn() -> Value) -> Value {
        self.store.get_or(key, default)
    }

    fn set(&self, key: &str, value: Value) -> Generation {
        let mut armed = None;
        let generation = self
            .store
            .write_as(key, value, Some(self.pane), |g| armed = Some(self.echo.arm(key, g)));
        drop(armed);
        generation
    }
}

impl EventAccess for ScopedCapabilities {
    fn on(&self, topic: &str, listener: Listener) -> Subscription {
        let echo = Arc::clone(&self.echo);
        let guarded: Listener = Arc::new(move |msg: &Message| {
            if echo.suppresses(msg) {
                return;
            }
            listener(msg);
        });

        let sub = self.bus.on(topic, guarded);
        if self.revoked.load(Ordering::Acquire) {
            sub.unsubscribe();
            return sub;
        }
        let mut owned = lock(&self.owned);
        // drop handles the pane already revoked itself
        owned.retain(Subscription::is_active);
        owned.push(sub.clone());
        sub
    }

    fn emit(&self, topic: &str, payload: Value) {
        self.bus.emit(topic, payload);
    }
}

impl Capabilities for ScopedCapabilities {
    fn state(&self) -> &dyn StateAccess {
        self
    }

    fn events(&self) -> &dyn EventAccess {
        self
    }
}
