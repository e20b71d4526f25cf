use std::sync::Arc;

use super::config::Config;
use super::runtime::Runtime;
use crate::error::ConfigError;
use crate::events::Bus;
use crate::panes::PaneRegistry;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for a [`Runtime`] with diagnostics subscribers or a shared registry.
pub struct RuntimeBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    registry: Option<Arc<PaneRegistry>>,
}

impl RuntimeBuilder {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            registry: None,
        }
    }

    /// Sets diagnostics subscribers.
    ///
    /// Each gets a dedicated worker with a bounded queue, so building with
    /// subscribers requires a tokio runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Uses `registry` instead of a fresh, empty one.
    pub fn with_registry(mut self, registry: Arc<PaneRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builds the runtime.
    ///
    /// Fails with [`ConfigError::NoAsyncRuntime`] if subscribers were given outside
    /// a tokio runtime.
    pub fn build(self) -> Result<Runtime, ConfigError> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let set = if self.subscribers.is_empty() {
            None
        } else {
            if tokio::runtime::Handle::try_current().is_err() {
                return Err(ConfigError::NoAsyncRuntime);
            }
            Some(SubscriberSet::new(self.subscribers, bus.clone()))
        };
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(PaneRegistry::new()));

        Ok(Runtime::from_parts(self.cfg, registry, bus, set))
    }
}
