//! # Pane factories.
//!
//! [`PaneFn`] wraps a closure `Fn(Container, Arc<dyn Capabilities>) -> Result<C, PaneError>`
//! where `C: PaneController`. The closure runs once per mounted container.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use panevisor::{Capabilities, Container, PaneError, PaneFn, PaneRef};
//!
//! let label: PaneRef = PaneFn::arc(|container: Container, caps: Arc<dyn Capabilities>| {
//!     let value = caps.state().get("greeting");
//!     container.set_text(value["text"].as_str().unwrap_or("hello"));
//!     Ok::<_, PaneError>(())
//! });
//! # let _ = label;
//! ```

use std::sync::Arc;

use super::capabilities::Capabilities;
use super::pane::PaneController;
use crate::dom::Container;
use crate::error::PaneError;

/// Builds a controller for one container.
pub trait PaneFactory: Send + Sync + 'static {
    fn create(
        &self,
        container: Container,
        caps: Arc<dyn Capabilities>,
    ) -> Result<Box<dyn PaneController>, PaneError>;
}

/// Shared factory handle.
pub type PaneRef = Arc<dyn PaneFactory>;

/// Function-backed factory.
pub struct PaneFn<F> {
    f: F,
}

impl<F> PaneFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the factory and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F, C> PaneFactory for PaneFn<F>
where
    F: Fn(Container, Arc<dyn Capabilities>) -> Result<C, PaneError> + Send + Sync + 'static,
    C: PaneController,
{
    fn create(
        &self,
        container: Container,
        caps: Arc<dyn Capabilities>,
    ) -> Result<Box<dyn PaneController>, PaneError> {
        let controller = (self.f)(container, caps)?;
        Ok(Box::new(controller))
    }
}
