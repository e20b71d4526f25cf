use std::sync::Arc;

use serde_json::Value;

use crate::panes::PaneId;
use crate::state::Generation;

/// Metadata stamped on every state-change notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    /// Key of the slice that was written.
    pub key: Arc<str>,
    /// Write generation of `key` produced by this write.
    pub generation: Generation,
    /// Pane that performed the write, if it went through a pane's capabilities.
    pub writer: Option<PaneId>,
}

/// What a listener receives.
///
/// For state topics `payload` is the new slice value (`Null` after removal)
/// and `change` is set; for application topics `change` is `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub topic: Arc<str>,
    pub payload: Value,
    pub change: Option<Change>,
}

impl Message {
    /// Application event.
    pub fn new(topic: impl Into<Arc<str>>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            change: None,
        }
    }

    /// State-change notification.
    pub fn change(topic: impl Into<Arc<str>>, payload: Value, change: Change) -> Self {
        Self {
            topic: topic.into(),
            payload,
            change: Some(change),
        }
    }

    #[inline]
    pub fn is_change(&self) -> bool {
        self.change.is_some()
    }

    /// Key of the written slice, for state-change notifications.
    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.change.as_ref().map(|c| c.key.as_ref())
    }
}
