//! # Container discovery.
//!
//! Walks a subtree, finds every element carrying the marker attribute and mounts
//! one instance of the registered factory in each.
//!
//! ```text
//! for el in subtree (preorder) with marker attribute:
//!   ├─ already mounted (marker or lifecycle index) → ignored
//!   ├─ type not registered                          → skipped  (warn, PaneSkipped)
//!   ├─ factory Err / panic                          → failed   (FactoryFailed)
//!   └─ otherwise                                    → mounted
//! ```
//!
//! Running discovery twice over the same subtree mounts nothing the second time.

use std::sync::Arc;

use super::config::Config;
use super::lifecycle::Lifecycle;
use crate::dom::{Container, Document, ElementId};
use crate::error::PaneError;
use crate::events::{Bus, Event, EventKind};
use crate::panes::{PaneId, PaneRegistry};

/// Container whose declared type has no factory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skipped {
    pub element: ElementId,
    pub pane_type: String,
}

/// Container whose factory returned an error or panicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failed {
    pub element: ElementId,
    pub pane_type: String,
    pub error: PaneError,
}

/// Outcome of one discovery pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Instances mounted by this pass, in document order.
    pub mounted: Vec<PaneId>,
    pub skipped: Vec<Skipped>,
    pub failed: Vec<Failed>,
}

impl DiscoveryReport {
    /// True if nothing was skipped and no factory failed.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

pub(crate) fn discover(
    registry: &PaneRegistry,
    lifecycle: &Lifecycle,
    cfg: &Config,
    diagnostics: &Bus,
    document: &Arc<Document>,
    root: ElementId,
) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    for element in document.query_attribute(root, &cfg.marker_attribute) {
        if document.attribute(element, &cfg.mounted_attribute).is_some()
            || lifecycle.is_mounted(document, element)
        {
            continue;
        }
        let pane_type = document
            .attribute(element, &cfg.marker_attribute)
            .unwrap_or_default()
            .trim()
            .to_string();

        let Some(factory) = registry.get(&pane_type) else {
            tracing::warn!(pane_type = %pane_type, %element, "no factory registered for pane type");
            diagnostics.publish(
                Event::new(EventKind::PaneSkipped)
                    .with_pane_type(pane_type.as_str())
                    .with_element(element.index())
                    .with_reason("unregistered pane type"),
            );
            report.skipped.push(Skipped { element, pane_type });
            continue;
        };

        let container = Container::new(
            Arc::clone(document),
            element,
            pane_type.as_str(),
            &cfg.marker_attribute,
            &cfg.mounted_attribute,
        );
        match lifecycle.mount(&factory, container) {
            Ok(Some(id)) => report.mounted.push(id),
            Ok(None) => {}
            Err(error) => report.failed.push(Failed {
                element,
                pane_type,
                error,
            }),
        }
    }

    tracing::debug!(
        document = document.id(),
        mounted = report.mounted.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "discovery finished"
    );
    report
}
