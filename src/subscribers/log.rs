//! # Logging subscriber.
//!
//! [`LogWriter`] forwards diagnostics events to `tracing`, one line per event.
//! Failures log at `warn`, lifecycle at `info`, state traffic at `debug`:
//!
//! ```text
//! INFO  pane mounted pane=pane#1 pane_type=counter element=3
//! WARN  pane factory failed pane_type=chart element=7 reason="factory: missing data-key"
//! DEBUG state changed key=N generation=4
//! WARN  emit cycle detected topic=state:change:N
//! ```
//!
//! Install a `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see the output.

use async_trait::async_trait;

use super::Subscribe;
use crate::events::{Event, EventKind};

/// `tracing`-backed diagnostics subscriber.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let pane = e.pane.map(|p| p.to_string()).unwrap_or_default();
        let pane_type = e.pane_type.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::PaneRegistered => {
                tracing::info!(pane_type, "pane type registered");
            }
            EventKind::PaneMounted => {
                tracing::info!(%pane, pane_type, element = ?e.element, "pane mounted");
            }
            EventKind::PaneDestroyed => {
                tracing::info!(%pane, pane_type, "pane destroyed");
            }
            EventKind::PaneSkipped => {
                tracing::warn!(pane_type, element = ?e.element, reason, "pane skipped");
            }
            EventKind::FactoryFailed => {
                tracing::warn!(pane_type, element = ?e.element, reason, "pane factory failed");
            }
            EventKind::DestroyFailed => {
                tracing::warn!(%pane, pane_type, reason, "pane destroy failed");
            }
            EventKind::StateChanged => {
                tracing::debug!(key = ?e.key, generation = ?e.generation, %pane, "state changed");
            }
            EventKind::StateRemoved => {
                tracing::debug!(key = ?e.key, generation = ?e.generation, "state removed");
            }
            EventKind::ListenerPanicked => {
                tracing::warn!(topic = ?e.topic, reason, "listener panicked");
            }
            EventKind::CycleDetected => {
                tracing::warn!(topic = ?e.topic, reason, "emit cycle detected");
            }
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = ?e.subscriber, reason, kind = ?e.kind, "diagnostics subscriber trouble");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
