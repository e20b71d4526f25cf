//! # Keyed state store.
//!
//! [`StateStore`] holds one current value per key. Reads never mutate (apart from
//! materializing a default), writes replace the whole value and notify through the
//! pane [`EventBus`] on the generic and the key-scoped change topics.
//!
//! ## Rules
//! - `set` fully replaces; there are no field-level writes.
//! - The store lock is released before any notification, so listeners may read
//!   and write the store re-entrantly.
//! - Notification fan-out completes before `set` returns.
//! - Generations survive [`StateStore::remove`]; a key never reuses a generation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use super::defaults::{DefaultFn, Defaults};
use super::generation::Generation;
use crate::error::ConfigError;
use crate::events::{Bus, Event, EventKind};
use crate::panes::PaneId;
use crate::pubsub::{key_topic, Change, EventBus, Message, CHANGE_TOPIC};
use crate::sync::{read, write};

#[derive(Default)]
struct Slot {
    value: Option<Value>,
    generation: Generation,
}

/// Shared, keyed state.
pub struct StateStore {
    slots: RwLock<HashMap<Arc<str>, Slot>>,
    defaults: Defaults,
    bus: EventBus,
    diagnostics: Bus,
}

impl StateStore {
    /// Creates an empty store that notifies through `bus`.
    pub fn new(bus: EventBus, diagnostics: Bus) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            defaults: Defaults::new(),
            bus,
            diagnostics,
        }
    }

    /// Registers the default materialized by [`get`](Self::get) for `key`.
    pub fn register_default(&self, key: &str, factory: DefaultFn) -> Result<(), ConfigError> {
        self.defaults.register(key, factory)
    }

    /// Reads `key`.
    ///
    /// - stored value → a clone of it;
    /// - no value but a registered default → the default, stored at its current generation
    ///   (no notification);
    /// - otherwise → an empty object, not stored.
    pub fn get(&self, key: &str) -> Value {
        if let Some(value) = self.try_get(key) {
            return value;
        }
        match self.defaults.produce(key) {
            Some(default) => self.materialize(key, default),
            None => Value::Object(Map::new()),
        }
    }

    /// Reads `key`, materializing `default()` if it has no value yet.
    ///
    /// A default registered with [`register_default`](Self::register_default) wins over `default`.
    pub fn get_or(&self, key: &str, default: &dyn Fn() -> Value) -> Value {
        if let Some(value) = self.try_get(key) {
            return value;
        }
        let value = self.defaults.produce(key).unwrap_or_else(default);
        self.materialize(key, value)
    }

    /// Reads `key` without materializing anything.
    pub fn try_get(&self, key: &str) -> Option<Value> {
        read(&self.slots).get(key).and_then(|s| s.value.clone())
    }

    /// Replaces the value of `key` and notifies listeners. Returns the new generation.
    pub fn set(&self, key: &str, value: Value) -> Generation {
        self.write_as(key, value, None, |_| {})
    }

    /// Read-modify-write of the whole slice.
    pub fn update(&self, key: &str, f: impl FnOnce(&mut Value)) -> Generation {
        let mut value = self.get(key);
        f(&mut value);
        self.set(key, value)
    }

    /// Deletes `key` and notifies listeners with `Null`.
    ///
    /// Returns `false` (and notifies nobody) if the key held no value.
    pub fn remove(&self, key: &str) -> bool {
        let generation = {
            let mut slots = write(&self.slots);
            let Some(slot) = slots.get_mut(key) else {
                return false;
            };
            if slot.value.take().is_none() {
                return false;
            }
            slot.generation = slot.generation.next();
            slot.generation
        };
        let key: Arc<str> = Arc::from(key);

        self.diagnostics.publish(
            Event::new(EventKind::StateRemoved)
                .with_key(Arc::clone(&key))
                .with_generation(generation.get()),
        );
        self.notify(key, Value::Null, generation, None);
        true
    }

    /// Current generation of `key` ([`Generation::ZERO`] if never written).
    pub fn generation(&self, key: &str) -> Generation {
        read(&self.slots).get(key).map_or(Generation::ZERO, |s| s.generation)
    }

    /// Keys currently holding a value, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = read(&self.slots)
            .iter()
            .filter(|(_, s)| s.value.is_some())
            .map(|(k, _)| k.to_string())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Write path shared by [`set`](Self::set) and pane capabilities.
    ///
    /// `on_commit` runs after the value is stored and before any listener is notified.
    pub(crate) fn write_as(
        &self,
        key: &str,
        value: Value,
        writer: Option<PaneId>,
        on_commit: impl FnOnce(Generation),
    ) -> Generation {
        let (key, generation) = {
            let mut slots = write(&self.slots);
            let key = match slots.get_key_value(key) {
                Some((k, _)) => Arc::clone(k),
                None => Arc::from(key),
            };
            let slot = slots.entry(Arc::clone(&key)).or_default();
            slot.generation = slot.generation.next();
            slot.value = Some(value.clone());
            (key, slot.generation)
        };

        on_commit(generation);

        let mut ev = Event::new(EventKind::StateChanged)
            .with_key(Arc::clone(&key))
            .with_generation(generation.get());
        if let Some(pane) = writer {
            ev = ev.with_pane(pane);
        }
        self.diagnostics.publish(ev);

        self.notify(key, value, generation, writer);
        generation
    }

    fn notify(&self, key: Arc<str>, value: Value, generation: Generation, writer: Option<PaneId>) {
        let change = Change {
            key,
            generation,
            writer,
        };
        let scoped = key_topic(&change.key);
        self.bus
            .publish(Message::change(CHANGE_TOPIC, value.clone(), change.clone()));
        self.bus.publish(Message::change(scoped, value, change));
    }

    fn materialize(&self, key: &str, value: Value) -> Value {
        let mut slots = write(&self.slots);
        let slot = slots.entry(Arc::from(key)).or_default();
        // a writer may have raced us between the read and this lock
        slot.value.get_or_insert(value).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubsub::Listener;
    use serde_json::json;
    use std::sync::Mutex;

    fn store() -> (StateStore, EventBus) {
        let diagnostics = Bus::new(64);
        let bus = EventBus::new(Some(16), diagnostics.clone());
        (StateStore::new(bus.clone(), diagnostics), bus)
    }

    fn collect(bus: &EventBus, topic: &str) -> Arc<Mutex<Vec<Message>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s2 = Arc::clone(&seen);
        let l: Listener = Arc::new(move |m: &Message| s2.lock().unwrap().push(m.clone()));
        bus.on(topic, l);
        seen
    }

    #[test]
    fn set_then_get_returns_value() {
        let (store, _) = store();
        store.set("profile", json!({ "name": "Ada" }));
        assert_eq!(store.get("profile"), json!({ "name": "Ada" }));
    }

    #[test]
    fn missing_key_without_default_is_empty_object_and_not_stored() {
        let (store, _) = store();
        assert_eq!(store.get("missing-key"), json!({}));
        assert_eq!(store.try_get("missing-key"), None);
        assert!(store.keys().is_empty());
    }

    #[test]
    fn registered_default_is_materialized_once_without_notification() {
        let (store, bus) = store();
        let seen = collect(&bus, CHANGE_TOPIC);
        store
            .register_default("N", Arc::new(|| json!({ "count": 0 })))
            .unwrap();

        assert_eq!(store.get("N"), json!({ "count": 0 }));
        assert_eq!(store.try_get("N"), Some(json!({ "count": 0 })));
        assert_eq!(store.generation("N"), Generation::ZERO);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn get_or_materializes_caller_default() {
        let (store, _) = store();
        let v = store.get_or("form", &|| json!({ "email": "" }));
        assert_eq!(v, json!({ "email": "" }));
        // first materialization sticks
        assert_eq!(store.get_or("form", &|| json!({ "other": 1 })), v);
    }

    #[test]
    fn first_set_with_merged_default_establishes_value() {
        let (store, _) = store();
        let mut v = store.get_or("settings", &|| json!({ "lang": "en", "dark": false }));
        v["dark"] = json!(true);
        store.set("settings", v);
        assert_eq!(store.get("settings"), json!({ "lang": "en", "dark": true }));
    }

    #[test]
    fn set_notifies_generic_then_scoped() {
        let (store, bus) = store();
        let order = Arc::new(Mutex::new(Vec::new()));
        for topic in [CHANGE_TOPIC, "state:change:N"] {
            let o = Arc::clone(&order);
            bus.on(
                topic,
                Arc::new(move |m: &Message| o.lock().unwrap().push(m.topic.to_string())),
            );
        }

        store.set("N", json!(1));
        assert_eq!(*order.lock().unwrap(), vec!["state:change", "state:change:N"]);
    }

    #[test]
    fn identical_writes_still_notify() {
        let (store, bus) = store();
        let seen = collect(&bus, "state:change:N");
        store.set("N", json!(1));
        store.set("N", json!(1));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].change.as_ref().unwrap().generation, Generation::new(2));
    }

    #[test]
    fn listeners_observe_new_value_during_fan_out() {
        let (store, bus) = store();
        let store = Arc::new(store);
        let observed = Arc::new(Mutex::new(None));
        let (s2, o2) = (Arc::clone(&store), Arc::clone(&observed));
        bus.on(
            "state:change:N",
            Arc::new(move |_m: &Message| *o2.lock().unwrap() = Some(s2.get("N"))),
        );
        store.set("N", json!(7));
        assert_eq!(*observed.lock().unwrap(), Some(json!(7)));
    }

    #[test]
    fn on_commit_runs_before_listeners() {
        let (store, bus) = store();
        let trace = Arc::new(Mutex::new(Vec::new()));
        let t2 = Arc::clone(&trace);
        bus.on(
            "state:change:N",
            Arc::new(move |_m: &Message| t2.lock().unwrap().push("listener")),
        );
        let t3 = Arc::clone(&trace);
        store.write_as("N", json!(1), Some(PaneId::from_raw(1)), |g| {
            assert_eq!(g, Generation::new(1));
            t3.lock().unwrap().push("commit");
        });
        assert_eq!(*trace.lock().unwrap(), vec!["commit", "listener"]);
    }

    #[test]
    fn update_reads_modifies_and_writes_whole_slice() {
        let (store, _) = store();
        store
            .register_default("N", Arc::new(|| json!({ "count": 0 })))
            .unwrap();
        let bump = |v: &mut Value| {
            let n = v["count"].as_i64().unwrap_or(0);
            v["count"] = json!(n + 1);
        };
        store.update("N", bump);
        store.update("N", bump);
        assert_eq!(store.get("N"), json!({ "count": 2 }));
        assert_eq!(store.generation("N"), Generation::new(2));
    }

    #[test]
    fn remove_notifies_null_and_keeps_generation_monotonic() {
        let (store, bus) = store();
        let seen = collect(&bus, "state:change:N");
        store.set("N", json!(1));
        assert!(store.remove("N"));
        assert!(!store.remove("N"));
        assert_eq!(store.try_get("N"), None);
        assert_eq!(store.generation("N"), Generation::new(2));

        store.set("N", json!(3));
        assert_eq!(store.generation("N"), Generation::new(3));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1].payload, Value::Null);
    }

    #[test]
    fn writes_are_reported_to_diagnostics() {
        let diagnostics = Bus::new(16);
        let mut rx = diagnostics.subscribe();
        let store = StateStore::new(EventBus::new(Some(4), diagnostics.clone()), diagnostics);
        store.set("N", json!(1));
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::StateChanged);
        assert_eq!(ev.key.as_deref(), Some("N"));
        assert_eq!(ev.generation, Some(1));
    }

    #[test]
    fn keys_lists_only_present_values() {
        let (store, _) = store();
        store.set("b", json!(1));
        store.set("a", json!(1));
        store.set("c", json!(1));
        store.remove("c");
        assert_eq!(store.keys(), vec!["a", "b"]);
    }
}
