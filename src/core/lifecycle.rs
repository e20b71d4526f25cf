//! # Pane lifecycle manager.
//!
//! Drives each pane instance through `Uninitialized → Mounted → Destroyed`.
//!
//! ## Mount
//! ```text
//! mount(factory, container)
//!   ├─► reserve container (document id, element) → PaneId
//!   ├─► set mounted marker on the element
//!   ├─► factory.create(container, ScopedCapabilities)   (panic caught)
//!   │     ├─ Ok  → store instance, publish PaneMounted
//!   │     └─ Err → revoke subscriptions + element listeners, clear marker,
//!   │              release reservation, publish FactoryFailed
//! ```
//!
//! ## Destroy
//! ```text
//! destroy(id)                      (second call: no-op, returns false)
//!   ├─► take instance out of the table
//!   ├─► controller.destroy()      (error/panic → DestroyFailed, cleanup continues)
//!   ├─► revoke every subscription the instance created
//!   ├─► remove every element listener it registered
//!   └─► clear mounted marker, publish PaneDestroyed
//! ```
//!
//! No lock is held while pane code (factory, destroy hook) runs.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::dom::{Container, Document, ElementId};
use crate::error::{panic_message, PaneError};
use crate::events::{Bus, Event, EventKind};
use crate::panes::{Capabilities, PaneController, PaneId, PaneRef, PaneState, ScopedCapabilities};
use crate::pubsub::EventBus;
use crate::state::StateStore;
use crate::sync::lock;

type ContainerKey = (u64, ElementId);

struct Instance {
    pane_type: Arc<str>,
    container: Container,
    controller: Option<Box<dyn PaneController>>,
    caps: Arc<ScopedCapabilities>,
}

impl Instance {
    fn key(&self) -> ContainerKey {
        (self.container.document().id(), self.container.element())
    }
}

pub(crate) struct Lifecycle {
    instances: Mutex<HashMap<PaneId, Instance>>,
    by_container: Mutex<HashMap<ContainerKey, PaneId>>,
    next_id: AtomicU64,
    store: Arc<StateStore>,
    bus: EventBus,
    diagnostics: Bus,
    mounted_attribute: String,
}

impl Lifecycle {
    pub(crate) fn new(
        store: Arc<StateStore>,
        bus: EventBus,
        diagnostics: Bus,
        mounted_attribute: String,
    ) -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
            by_container: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            store,
            bus,
            diagnostics,
            mounted_attribute,
        }
    }

    /// Mounts one instance of `factory` in `container`.
    ///
    /// `Ok(None)` if the container already hosts (or is mounting) an instance.
    pub(crate) fn mount(
        &self,
        factory: &PaneRef,
        container: Container,
    ) -> Result<Option<PaneId>, PaneError> {
        let key = (container.document().id(), container.element());
        let id = {
            let mut index = lock(&self.by_container);
            if index.contains_key(&key) {
                return Ok(None);
            }
            let id = PaneId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
            index.insert(key, id);
            id
        };

        let document = Arc::clone(container.document());
        let element = container.element();
        let pane_type: Arc<str> = Arc::from(container.pane_type());
        document.set_attribute(element, &self.mounted_attribute, &id.to_string());

        let caps = Arc::new(ScopedCapabilities::new(
            id,
            Arc::clone(&self.store),
            self.bus.clone(),
        ));
        let handed: Arc<dyn Capabilities> = caps.clone();
        let created = catch_unwind(AssertUnwindSafe(|| factory.create(container.clone(), handed)))
            .unwrap_or_else(|payload| {
                Err(PaneError::Panicked {
                    info: panic_message(&*payload),
                })
            });

        match created {
            Ok(controller) => {
                lock(&self.instances).insert(
                    id,
                    Instance {
                        pane_type: Arc::clone(&pane_type),
                        container,
                        controller: Some(controller),
                        caps,
                    },
                );
                tracing::debug!(pane = %id, pane_type = %pane_type, %element, "pane mounted");
                self.diagnostics.publish(
                    Event::new(EventKind::PaneMounted)
                        .with_pane(id)
                        .with_pane_type(pane_type)
                        .with_element(element.index()),
                );
                Ok(Some(id))
            }
            Err(err) => {
                caps.revoke();
                container.release_listeners();
                self.clear_marker(&document, element, id);
                lock(&self.by_container).remove(&key);

                tracing::warn!(pane_type = %pane_type, %element, error = %err, "pane factory failed");
                self.diagnostics.publish(
                    Event::new(EventKind::FactoryFailed)
                        .with_pane_type(pane_type)
                        .with_element(element.index())
                        .with_reason(err.as_message()),
                );
                Err(err)
            }
        }
    }

    /// Destroys instance `id`. Returns `false` if it is not mounted (already destroyed).
    pub(crate) fn destroy(&self, id: PaneId) -> bool {
        let Some(mut instance) = lock(&self.instances).remove(&id) else {
            return false;
        };
        {
            let mut index = lock(&self.by_container);
            let key = instance.key();
            if index.get(&key) == Some(&id) {
                index.remove(&key);
            }
        }

        if let Some(mut controller) = instance.controller.take() {
            let outcome = catch_unwind(AssertUnwindSafe(|| controller.destroy()))
                .unwrap_or_else(|payload| {
                    Err(PaneError::Panicked {
                        info: panic_message(&*payload),
                    })
                });
            if let Err(err) = outcome {
                tracing::warn!(pane = %id, pane_type = %instance.pane_type, error = %err, "pane destroy failed");
                self.diagnostics.publish(
                    Event::new(EventKind::DestroyFailed)
                        .with_pane(id)
                        .with_pane_type(Arc::clone(&instance.pane_type))
                        .with_reason(err.as_message()),
                );
            }
        }

        let subscriptions = instance.caps.revoke();
        let listeners = instance.container.release_listeners();
        let element = instance.container.element();
        self.clear_marker(instance.container.document(), element, id);

        tracing::debug!(pane = %id, subscriptions, listeners, "pane destroyed");
        self.diagnostics.publish(
            Event::new(EventKind::PaneDestroyed)
                .with_pane(id)
                .with_pane_type(instance.pane_type)
                .with_element(element.index()),
        );
        true
    }

    /// Destroys the instance mounted in `element` of `document`, if any.
    pub(crate) fn destroy_container(&self, document: &Document, element: ElementId) -> bool {
        let id = lock(&self.by_container).get(&(document.id(), element)).copied();
        id.is_some_and(|id| self.destroy(id))
    }

    /// Destroys every mounted instance. Returns how many were destroyed.
    pub(crate) fn destroy_all(&self) -> usize {
        self.panes().into_iter().filter(|id| self.destroy(*id)).count()
    }

    /// Destroys instances of `document` whose container is no longer attached.
    pub(crate) fn prune(&self, document: &Document) -> Vec<PaneId> {
        let detached: Vec<PaneId> = {
            let instances = lock(&self.instances);
            let mut ids: Vec<PaneId> = instances
                .iter()
                .filter(|(_, inst)| {
                    inst.container.document().id() == document.id()
                        && !document.is_attached(inst.container.element())
                })
                .map(|(id, _)| *id)
                .collect();
            ids.sort_unstable();
            ids
        };
        detached.into_iter().filter(|id| self.destroy(*id)).collect()
    }

    pub(crate) fn is_mounted(&self, document: &Document, element: ElementId) -> bool {
        lock(&self.by_container).contains_key(&(document.id(), element))
    }

    /// Mounted instance ids, sorted.
    pub(crate) fn panes(&self) -> Vec<PaneId> {
        let mut ids: Vec<PaneId> = lock(&self.instances).keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Failed mounts count as `Destroyed`: the id was issued and is gone for good.
    pub(crate) fn state(&self, id: PaneId) -> PaneState {
        if lock(&self.instances).contains_key(&id) {
            PaneState::Mounted
        } else if id.get() > 0 && id.get() < self.next_id.load(Ordering::Relaxed) {
            PaneState::Destroyed
        } else {
            PaneState::Uninitialized
        }
    }

    pub(crate) fn pane_type(&self, id: PaneId) -> Option<String> {
        lock(&self.instances)
            .get(&id)
            .map(|inst| inst.pane_type.to_string())
    }

    pub(crate) fn container(&self, id: PaneId) -> Option<Container> {
        lock(&self.instances).get(&id).map(|inst| inst.container.clone())
    }

    /// Live subscriptions owned by instance `id`.
    pub(crate) fn subscriptions(&self, id: PaneId) -> Option<usize> {
        lock(&self.instances)
            .get(&id)
            .map(|inst| inst.caps.live_subscriptions())
    }

    fn clear_marker(&self, document: &Document, element: ElementId, id: PaneId) {
        if document.attribute(element, &self.mounted_attribute).as_deref() == Some(&*id.to_string()) {
            document.remove_attribute(element, &self.mounted_attribute);
        }
    }
}
