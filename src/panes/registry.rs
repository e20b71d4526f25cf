//! # Pane registry.
//!
//! Maps a pane type name to its factory. A registry is an ordinary value owned by
//! whoever bootstraps the page and handed to discovery explicitly; independent
//! registries can coexist (one per runtime, one per test).
//!
//! ## Rules
//! - A type name is registered at most once; a duplicate is a [`ConfigError`]
//!   and the first factory stays active.
//! - Type names are trimmed; an empty name is rejected.

use std::collections::HashMap;
use std::sync::RwLock;

use super::factory::{PaneFactory, PaneRef};
use crate::error::ConfigError;
use crate::sync::{read, write};

/// Type name → factory.
#[derive(Default)]
pub struct PaneRegistry {
    factories: RwLock<HashMap<String, PaneRef>>,
}

impl PaneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for `type_name`.
    pub fn register(&self, type_name: &str, factory: PaneRef) -> Result<(), ConfigError> {
        let name = type_name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyPaneType);
        }

        let mut factories = write(&self.factories);
        if factories.contains_key(name) {
            return Err(ConfigError::DuplicatePane {
                type_name: name.to_string(),
            });
        }
        factories.insert(name.to_string(), factory);
        Ok(())
    }

    /// Registers a concrete factory value.
    pub fn register_factory<F: PaneFactory>(
        &self,
        type_name: &str,
        factory: F,
    ) -> Result<(), ConfigError> {
        self.register(type_name, std::sync::Arc::new(factory))
    }

    /// Factory for `type_name`, if registered.
    pub fn get(&self, type_name: &str) -> Option<PaneRef> {
        read(&self.factories).get(type_name.trim()).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        read(&self.factories).contains_key(type_name.trim())
    }

    /// Registered type names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.factories).keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        read(&self.factories).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.factories).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Container, Document};
    use crate::error::PaneError;
    use crate::events::Bus;
    use crate::panes::{Capabilities, PaneFn, PaneId, ScopedCapabilities};
    use crate::pubsub::EventBus;
    use crate::state::StateStore;
    use std::sync::Arc;

    fn named(tag: &'static str) -> PaneRef {
        PaneFn::arc(move |c: Container, _caps: Arc<dyn Capabilities>| {
            c.set_text(tag);
            Ok::<_, PaneError>(())
        })
    }

    #[test]
    fn duplicate_is_rejected_and_first_stays() {
        let reg = PaneRegistry::new();
        reg.register("counter", named("first")).unwrap();
        let err = reg.register("counter", named("second")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicatePane {
                type_name: "counter".into()
            }
        );
        assert_eq!(reg.len(), 1);

        let factory = reg.get("counter").unwrap();
        let doc = Arc::new(Document::new());
        let el = doc.append_new(doc.root(), "div");
        let container = Container::new(Arc::clone(&doc), el, "counter", "data-pane", "data-pane-mounted");
        let diagnostics = Bus::new(16);
        let bus = EventBus::new(None, diagnostics.clone());
        let store = Arc::new(StateStore::new(bus.clone(), diagnostics));
        let caps = Arc::new(ScopedCapabilities::new(PaneId::from_raw(1), store, bus));
        factory.create(container, caps).unwrap();
        assert_eq!(doc.text(el).as_deref(), Some("first"));
    }

    #[test]
    fn names_are_trimmed_and_must_not_be_empty() {
        let reg = PaneRegistry::new();
        assert_eq!(reg.register("   ", named("x")), Err(ConfigError::EmptyPaneType));
        reg.register(" chart ", named("x")).unwrap();
        assert!(reg.contains("chart"));
        assert!(reg.get("  chart").is_some());
        assert!(matches!(
            reg.register("chart", named("y")),
            Err(ConfigError::DuplicatePane { .. })
        ));
    }

    #[test]
    fn registries_are_independent() {
        let a = PaneRegistry::new();
        let b = PaneRegistry::new();
        a.register("counter", named("x")).unwrap();
        assert!(b.is_empty());
        b.register("counter", named("y")).unwrap();
        assert_eq!(a.list(), b.list());
    }

    #[test]
    fn list_is_sorted() {
        let reg = PaneRegistry::new();
        reg.register("zeta", named("z")).unwrap();
        reg.register("alpha", named("a")).unwrap();
        assert_eq!(reg.list(), vec!["alpha", "zeta"]);
    }
}
