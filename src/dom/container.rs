//! # Pane container handle.
//!
//! A [`Container`] is what a pane factory receives: its element, the declared pane
//! type, the opaque configuration attributes, and a way to attach element listeners
//! that belong to the pane instance (and are removed when it is destroyed).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::document::{DocEvent, Document, ElementId, ListenerId};
use crate::sync::lock;

/// Handle to the element a pane is mounted in.
#[derive(Clone)]
pub struct Container {
    document: Arc<Document>,
    element: ElementId,
    pane_type: Arc<str>,
    reserved: Arc<[String; 2]>,
    owned_listeners: Arc<Mutex<Vec<ListenerId>>>,
}

impl Container {
    /// `marker` and `mounted_marker` are hidden from [`config`](Self::config).
    pub(crate) fn new(
        document: Arc<Document>,
        element: ElementId,
        pane_type: impl Into<Arc<str>>,
        marker: &str,
        mounted_marker: &str,
    ) -> Self {
        Self {
            document,
            element,
            pane_type: pane_type.into(),
            reserved: Arc::new([marker.to_string(), mounted_marker.to_string()]),
            owned_listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[inline]
    pub fn element(&self) -> ElementId {
        self.element
    }

    #[inline]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Pane type declared by the container.
    #[inline]
    pub fn pane_type(&self) -> &str {
        &self.pane_type
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.document.attribute(self.element, name)
    }

    /// Configuration attributes: everything except the runtime's own markers.
    pub fn config(&self) -> BTreeMap<String, String> {
        let mut attrs = self.document.attributes(self.element);
        for name in self.reserved.iter() {
            attrs.remove(name);
        }
        attrs
    }

    pub fn set_text(&self, text: &str) {
        self.document.set_text(self.element, text);
    }

    pub fn text(&self) -> String {
        self.document.text(self.element).unwrap_or_default()
    }

    /// Creates a child element of the container.
    pub fn append(&self, tag: &str) -> ElementId {
        self.document.append_new(self.element, tag)
    }

    /// Listens to `name` events on the container element itself.
    pub fn on(&self, name: &str, f: impl Fn(&DocEvent) + Send + Sync + 'static) -> ListenerId {
        self.listen(self.element, name, f)
    }

    /// Listens to `name` events on `element` (typically a child the pane created).
    ///
    /// The listener is owned by the pane instance and removed on destroy.
    pub fn listen(
        &self,
        element: ElementId,
        name: &str,
        f: impl Fn(&DocEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.document.add_listener(element, name, Arc::new(f));
        lock(&self.owned_listeners).push(id);
        id
    }

    /// Removes every listener registered through this container. Returns how many were live.
    pub(crate) fn release_listeners(&self) -> usize {
        let ids: Vec<ListenerId> = lock(&self.owned_listeners).drain(..).collect();
        ids.into_iter()
            .filter(|id| self.document.remove_listener(*id))
            .count()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("document", &self.document.id())
            .field("element", &self.element)
            .field("pane_type", &self.pane_type)
            .finish()
    }
}
