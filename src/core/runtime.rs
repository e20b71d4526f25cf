//! # Runtime: registry, state, pane bus and lifecycle behind one handle.
//!
//! The [`Runtime`] owns the state store, the pane event bus, the lifecycle manager
//! and the diagnostics [`Bus`]. When built with subscribers it also runs a listener
//! task that forwards diagnostics to a [`SubscriberSet`].
//!
//! ## Architecture
//! ```text
//! bootstrap:
//!   PaneRegistry ──► RuntimeBuilder::with_registry ──► Runtime
//!   register("counter", factory) ─► PaneRegistered
//!
//! discover(document):
//!   Document ──► discovery ──► Lifecycle::mount ──► factory(container, caps)
//!                                                    │
//!               caps.state().set(K, V) ─► StateStore ─► EventBus
//!                                                    ├─► "state:change"     listeners
//!                                                    └─► "state:change:K"   listeners
//!                                                        (writer's own listeners skip it)
//!
//! diagnostics:
//!   Lifecycle / StateStore / EventBus ─► Bus ─► listener task ─► SubscriberSet ─► Subscribe
//!
//! shutdown():
//!   destroy_all() ─► cancel token ─► listener drains Bus ─► SubscriberSet::shutdown
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use panevisor::{Capabilities, Config, Container, Document, PaneError, Runtime};
//!
//! let rt = Runtime::new(Config::default());
//! rt.register_default("N", || json!({ "value": 0 })).unwrap();
//! rt.register_fn("label", |c: Container, caps: Arc<dyn Capabilities>| {
//!     c.set_text(&caps.state().get("N")["value"].to_string());
//!     Ok::<_, PaneError>(())
//! })
//! .unwrap();
//!
//! let doc = Arc::new(Document::new());
//! let el = doc.append_new(doc.root(), "div");
//! doc.set_attribute(el, "data-pane", "label");
//!
//! let report = rt.discover(&doc);
//! assert_eq!(report.mounted.len(), 1);
//! assert_eq!(doc.text(el).as_deref(), Some("0"));
//! ```

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::builder::RuntimeBuilder;
use super::config::Config;
use super::discovery::{discover, DiscoveryReport};
use super::lifecycle::Lifecycle;
use crate::dom::{Container, Document, ElementId};
use crate::error::{ConfigError, PaneError};
use crate::events::{Bus, Event, EventKind};
use crate::panes::{Capabilities, PaneController, PaneFn, PaneId, PaneRef, PaneRegistry, PaneState};
use crate::pubsub::EventBus;
use crate::state::StateStore;
use crate::subscribers::SubscriberSet;
use crate::sync::lock;

/// Reactive core for one page (or one test).
pub struct Runtime {
    cfg: Config,
    registry: Arc<PaneRegistry>,
    store: Arc<StateStore>,
    bus: EventBus,
    diagnostics: Bus,
    lifecycle: Lifecycle,
    token: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Runtime {
    /// Runtime with its own empty registry and no diagnostics subscribers.
    ///
    /// Does not need a tokio runtime.
    pub fn new(cfg: Config) -> Self {
        let diagnostics = Bus::new(cfg.bus_capacity_clamped());
        Self::from_parts(cfg, Arc::new(PaneRegistry::new()), diagnostics, None)
    }

    /// Returns a builder for subscribers and an injected registry.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    pub(super) fn from_parts(
        cfg: Config,
        registry: Arc<PaneRegistry>,
        diagnostics: Bus,
        subscribers: Option<SubscriberSet>,
    ) -> Self {
        let bus = EventBus::new(cfg.emit_depth_limit(), diagnostics.clone());
        let store = Arc::new(StateStore::new(bus.clone(), diagnostics.clone()));
        let lifecycle = Lifecycle::new(
            Arc::clone(&store),
            bus.clone(),
            diagnostics.clone(),
            cfg.mounted_attribute.clone(),
        );
        let token = CancellationToken::new();
        let listener = subscribers.map(|set| spawn_listener(&diagnostics, set, token.clone()));

        Self {
            cfg,
            registry,
            store,
            bus,
            diagnostics,
            lifecycle,
            token,
            listener: Mutex::new(listener),
        }
    }

    /// Registers `factory` under `type_name`.
    ///
    /// A duplicate name is rejected and the first factory stays active.
    pub fn register(&self, type_name: &str, factory: PaneRef) -> Result<(), ConfigError> {
        match self.registry.register(type_name, factory) {
            Ok(()) => {
                self.diagnostics
                    .publish(Event::new(EventKind::PaneRegistered).with_pane_type(type_name.trim()));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(type_name, error = %err, "pane registration rejected");
                Err(err)
            }
        }
    }

    /// Registers a closure factory.
    pub fn register_fn<F, C>(&self, type_name: &str, f: F) -> Result<(), ConfigError>
    where
        F: Fn(Container, Arc<dyn Capabilities>) -> Result<C, PaneError> + Send + Sync + 'static,
        C: PaneController,
    {
        self.register(type_name, PaneFn::arc(f))
    }

    /// Registers the default shape of state slice `key`.
    pub fn register_default<F>(&self, key: &str, f: F) -> Result<(), ConfigError>
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.store.register_default(key, Arc::new(f))
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn state(&self) -> &Arc<StateStore> {
        &self.store
    }

    #[inline]
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    #[inline]
    pub fn registry(&self) -> &Arc<PaneRegistry> {
        &self.registry
    }

    /// Diagnostics bus; `subscribe()` to it for raw events.
    #[inline]
    pub fn diagnostics(&self) -> &Bus {
        &self.diagnostics
    }

    /// Mounts every unmounted container in `document`.
    pub fn discover(&self, document: &Arc<Document>) -> DiscoveryReport {
        self.discover_in(document, document.root())
    }

    /// Mounts every unmounted container in the subtree under `root`.
    pub fn discover_in(&self, document: &Arc<Document>, root: ElementId) -> DiscoveryReport {
        self.discover_with(&self.registry, document, root)
    }

    /// Like [`discover_in`](Self::discover_in) with an explicit registry.
    pub fn discover_with(
        &self,
        registry: &PaneRegistry,
        document: &Arc<Document>,
        root: ElementId,
    ) -> DiscoveryReport {
        discover(
            registry,
            &self.lifecycle,
            &self.cfg,
            &self.diagnostics,
            document,
            root,
        )
    }

    /// Destroys instance `id`. Returns `false` if it was not mounted.
    pub fn destroy(&self, id: PaneId) -> bool {
        self.lifecycle.destroy(id)
    }

    pub fn destroy_container(&self, document: &Document, element: ElementId) -> bool {
        self.lifecycle.destroy_container(document, element)
    }

    pub fn destroy_all(&self) -> usize {
        self.lifecycle.destroy_all()
    }

    /// Destroys instances whose container was removed from `document`.
    pub fn prune(&self, document: &Document) -> Vec<PaneId> {
        self.lifecycle.prune(document)
    }

    /// Mounted instances, sorted by id.
    pub fn panes(&self) -> Vec<PaneId> {
        self.lifecycle.panes()
    }

    pub fn pane_state(&self, id: PaneId) -> PaneState {
        self.lifecycle.state(id)
    }

    pub fn pane_type(&self, id: PaneId) -> Option<String> {
        self.lifecycle.pane_type(id)
    }

    pub fn container(&self, id: PaneId) -> Option<Container> {
        self.lifecycle.container(id)
    }

    /// Live pane-bus subscriptions owned by instance `id`.
    pub fn pane_subscriptions(&self, id: PaneId) -> Option<usize> {
        self.lifecycle.subscriptions(id)
    }

    /// Destroys every pane, then stops the diagnostics listener after it has
    /// delivered everything published so far.
    pub async fn shutdown(&self) {
        let destroyed = self.destroy_all();
        tracing::debug!(destroyed, "runtime shutting down");
        self.token.cancel();

        let listener = lock(&self.listener).take();
        if let Some(handle) = listener {
            let _ = handle.await;
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // a listener may own its pane's caps; revoking breaks that cycle
        self.lifecycle.destroy_all();
        self.token.cancel();
    }
}

/// Forwards diagnostics from the bus to the subscriber set until cancelled.
fn spawn_listener(bus: &Bus, set: SubscriberSet, token: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "diagnostics listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }
        while let Ok(ev) = rx.try_recv() {
            set.emit(&ev);
        }
        set.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panes::EventAccessExt;
    use crate::subscribers::Subscribe;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Weak;

    fn label(c: Container, caps: Arc<dyn Capabilities>) -> Result<(), PaneError> {
        c.set_text(&caps.state().get("N")["value"].to_string());
        Ok(())
    }

    #[test]
    fn registration_is_published_and_duplicates_rejected() {
        let rt = Runtime::new(Config::default());
        let mut rx = rt.diagnostics().subscribe();
        rt.register_fn("label", label).unwrap();
        assert_eq!(
            rt.register_fn("label", label),
            Err(ConfigError::DuplicatePane {
                type_name: "label".into()
            })
        );
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::PaneRegistered);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn injected_registry_is_shared() {
        let registry = Arc::new(PaneRegistry::new());
        registry.register("label", PaneFn::arc(label)).unwrap();
        let rt = Runtime::builder(Config::default())
            .with_registry(Arc::clone(&registry))
            .build()
            .unwrap();
        assert!(rt.registry().contains("label"));
        assert!(Arc::ptr_eq(rt.registry(), &registry));
    }

    #[test]
    fn discover_with_uses_the_given_registry() {
        let rt = Runtime::new(Config::default());
        let other = PaneRegistry::new();
        other.register("label", PaneFn::arc(label)).unwrap();

        let doc = Arc::new(Document::new());
        let el = doc.append_new(doc.root(), "div");
        doc.set_attribute(el, "data-pane", "label");

        assert_eq!(rt.discover(&doc).skipped.len(), 1);
        let report = rt.discover_with(&other, &doc, doc.root());
        assert_eq!(report.mounted.len(), 1);
        assert_eq!(rt.pane_type(report.mounted[0]).as_deref(), Some("label"));
    }

    #[test]
    fn dropping_the_runtime_releases_self_referencing_panes() {
        let rt = Runtime::new(Config::default());
        let slot: Arc<Mutex<Option<Weak<dyn Capabilities>>>> = Arc::default();
        {
            let slot = Arc::clone(&slot);
            rt.register_fn("keeper", move |_c: Container, caps: Arc<dyn Capabilities>| {
                *slot.lock().unwrap() = Some(Arc::downgrade(&caps));
                let own = Arc::clone(&caps);
                caps.events().on_key("N", move |_m| {
                    own.events().emit("seen", json!(null));
                });
                Ok::<_, PaneError>(())
            })
            .unwrap();
        }

        let doc = Arc::new(Document::new());
        let el = doc.append_new(doc.root(), "div");
        doc.set_attribute(el, "data-pane", "keeper");
        assert_eq!(rt.discover(&doc).mounted.len(), 1);

        let caps = slot.lock().unwrap().clone().unwrap();
        assert!(caps.upgrade().is_some());

        drop(rt);
        assert!(caps.upgrade().is_none());
    }

    #[test]
    fn subscribers_need_an_async_runtime() {
        struct Quiet;
        #[async_trait]
        impl Subscribe for Quiet {
            async fn on_event(&self, _ev: &Event) {}
        }

        let res = Runtime::builder(Config::default())
            .with_subscribers(vec![Arc::new(Quiet)])
            .build();
        assert!(matches!(res, Err(ConfigError::NoAsyncRuntime)));
    }

    struct Collect(Arc<Mutex<Vec<EventKind>>>);

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    #[tokio::test]
    async fn shutdown_delivers_pending_diagnostics() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let rt = Runtime::builder(Config::default())
            .with_subscribers(vec![Arc::new(Collect(Arc::clone(&seen)))])
            .build()
            .unwrap();
        rt.register_fn("label", label).unwrap();

        let doc = Arc::new(Document::new());
        let el = doc.append_new(doc.root(), "div");
        doc.set_attribute(el, "data-pane", "label");
        rt.discover(&doc);
        rt.state().set("N", json!({ "value": 1 }));

        rt.shutdown().await;
        assert!(rt.panes().is_empty());

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                EventKind::PaneRegistered,
                EventKind::PaneMounted,
                EventKind::StateChanged,
                EventKind::PaneDestroyed,
            ]
        );
    }
}
