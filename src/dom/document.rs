//! # Element tree with listeners.
//!
//! ## Rules
//! - Element `0` is the root (`body`); it cannot be removed.
//! - `remove` detaches a subtree; its ids stay valid but are no longer attached.
//! - Unknown ids are ignored (setters return `false`, getters return `None`).
//! - `dispatch` fires listeners of the target element only, in registration order,
//!   on a snapshot; a panicking listener is logged and skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::panic_message;
use crate::sync::{lock, read, write};

static DOCUMENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Index of an element within its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}

/// Identifier of one element listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// What an element listener receives.
#[derive(Debug, Clone)]
pub struct DocEvent {
    pub target: ElementId,
    pub name: Arc<str>,
}

/// Element listener callback.
pub type DocListener = Arc<dyn Fn(&DocEvent) + Send + Sync>;

struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

struct ListenerEntry {
    id: ListenerId,
    element: ElementId,
    name: Arc<str>,
    listener: DocListener,
}

/// A tree of elements.
pub struct Document {
    id: u64,
    nodes: RwLock<Vec<Node>>,
    listeners: Mutex<Vec<ListenerEntry>>,
    next_listener: AtomicU64,
}

impl Document {
    /// Creates a document holding only the root element.
    pub fn new() -> Self {
        Self {
            id: DOCUMENT_SEQ.fetch_add(1, Ordering::Relaxed),
            nodes: RwLock::new(vec![Node::new("body")]),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Process-unique identity of this document.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Creates a detached element.
    pub fn create_element(&self, tag: &str) -> ElementId {
        let mut nodes = write(&self.nodes);
        nodes.push(Node::new(tag));
        ElementId(nodes.len() - 1)
    }

    /// Creates an element and appends it to `parent`.
    pub fn append_new(&self, parent: ElementId, tag: &str) -> ElementId {
        let child = self.create_element(tag);
        self.append_child(parent, child);
        child
    }

    /// Moves `child` under `parent` (detaching it from its old parent first).
    ///
    /// Refuses unknown ids, the root as child, and moves that would create a cycle.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> bool {
        let mut nodes = write(&self.nodes);
        if parent.0 >= nodes.len() || child.0 >= nodes.len() || child.0 == 0 {
            return false;
        }
        let mut cursor = Some(parent);
        while let Some(at) = cursor {
            if at == child {
                return false;
            }
            cursor = nodes[at.0].parent;
        }
        if let Some(old) = nodes[child.0].parent.take() {
            nodes[old.0].children.retain(|c| *c != child);
        }
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
        true
    }

    /// Detaches `element` (and its subtree) from the tree.
    pub fn remove(&self, element: ElementId) -> bool {
        let mut nodes = write(&self.nodes);
        if element.0 == 0 || element.0 >= nodes.len() {
            return false;
        }
        match nodes[element.0].parent.take() {
            Some(parent) => {
                nodes[parent.0].children.retain(|c| *c != element);
                true
            }
            None => false,
        }
    }

    /// `true` if `element` is reachable from the root.
    pub fn is_attached(&self, element: ElementId) -> bool {
        let nodes = read(&self.nodes);
        let mut cursor = Some(element);
        while let Some(at) = cursor {
            if at.0 >= nodes.len() {
                return false;
            }
            if at.0 == 0 {
                return true;
            }
            cursor = nodes[at.0].parent;
        }
        false
    }

    pub fn tag(&self, element: ElementId) -> Option<String> {
        read(&self.nodes).get(element.0).map(|n| n.tag.clone())
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        read(&self.nodes).get(element.0).and_then(|n| n.parent)
    }

    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        read(&self.nodes)
            .get(element.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn set_attribute(&self, element: ElementId, name: &str, value: &str) -> bool {
        match write(&self.nodes).get_mut(element.0) {
            Some(n) => {
                n.attributes.insert(name.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    pub fn remove_attribute(&self, element: ElementId, name: &str) -> Option<String> {
        write(&self.nodes)
            .get_mut(element.0)
            .and_then(|n| n.attributes.remove(name))
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        read(&self.nodes)
            .get(element.0)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    pub fn attributes(&self, element: ElementId) -> BTreeMap<String, String> {
        read(&self.nodes)
            .get(element.0)
            .map(|n| n.attributes.clone())
            .unwrap_or_default()
    }

    pub fn set_text(&self, element: ElementId, text: &str) -> bool {
        match write(&self.nodes).get_mut(element.0) {
            Some(n) => {
                n.text = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn text(&self, element: ElementId) -> Option<String> {
        read(&self.nodes).get(element.0).map(|n| n.text.clone())
    }

    /// `root` and everything below it, in document (pre-)order.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let nodes = read(&self.nodes);
        if root.0 >= nodes.len() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(at) = stack.pop() {
            out.push(at);
            stack.extend(nodes[at.0].children.iter().rev().copied());
        }
        out
    }

    /// Elements under `root` (inclusive) that carry attribute `name`.
    pub fn query_attribute(&self, root: ElementId, name: &str) -> Vec<ElementId> {
        let found = self.descendants(root);
        let nodes = read(&self.nodes);
        found
            .into_iter()
            .filter(|e| nodes[e.0].attributes.contains_key(name))
            .collect()
    }

    /// Registers `listener` for `name` events on `element`.
    pub fn add_listener(&self, element: ElementId, name: &str, listener: DocListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push(ListenerEntry {
            id,
            element,
            name: Arc::from(name),
            listener,
        });
        id
    }

    /// Removes one listener; `false` if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self, element: ElementId) -> usize {
        lock(&self.listeners)
            .iter()
            .filter(|l| l.element == element)
            .count()
    }

    /// Fires `name` on `element`. Returns how many listeners ran to completion.
    pub fn dispatch(&self, element: ElementId, name: &str) -> usize {
        let snapshot: Vec<(ListenerId, DocListener)> = lock(&self.listeners)
            .iter()
            .filter(|l| l.element == element && l.name.as_ref() == name)
            .map(|l| (l.id, Arc::clone(&l.listener)))
            .collect();

        let event = DocEvent {
            target: element,
            name: Arc::from(name),
        };
        let mut ran = 0;
        for (id, listener) in snapshot {
            // removed by an earlier listener of this dispatch
            if !lock(&self.listeners).iter().any(|l| l.id == id) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                Ok(()) => ran += 1,
                Err(payload) => {
                    let info = panic_message(&*payload);
                    tracing::warn!(%element, event = name, %info, "element listener panicked");
                }
            }
        }
        ran
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("elements", &read(&self.nodes).len())
            .finish()
    }
}
