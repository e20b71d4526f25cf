use std::fmt;

use crate::error::PaneError;

/// Identity of one pane instance, unique within its runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(u64);

impl PaneId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        PaneId(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane#{}", self.0)
    }
}

/// Lifecycle state of a pane instance.
///
/// ```text
/// Uninitialized ──factory Ok──► Mounted ──destroy──► Destroyed
///       │                                                ▲
///       └───────────factory Err / panic──────────────────┘
/// ```
/// `Destroyed` is terminal; a container can get a new instance, never the old one back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneState {
    Uninitialized,
    Mounted,
    Destroyed,
}

/// Controller returned by a pane factory.
///
/// The runtime owns it for as long as the instance is mounted and calls
/// [`destroy`](PaneController::destroy) exactly once. Subscriptions and element
/// listeners created through the pane's capabilities/container are revoked by the
/// runtime afterwards whether or not `destroy` succeeds.
pub trait PaneController: Send + 'static {
    /// Releases resources the runtime does not know about (timers, tasks, ...).
    fn destroy(&mut self) -> Result<(), PaneError> {
        Ok(())
    }
}

/// Controller for panes with nothing to tear down.
impl PaneController for () {}
