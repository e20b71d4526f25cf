//! Error types used by the panevisor runtime and by pane implementations.
//!
//! This module defines two main error enums:
//!
//! - [`ConfigError`] : wiring bugs detected at registration/build time (fail fast).
//! - [`PaneError`] : failures of an individual pane (factory or destroy), isolated
//!   to that pane's container.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Configuration errors.
///
/// These indicate a wiring bug, not a runtime condition, and are surfaced
/// immediately to the caller of the registering/building operation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A factory is already registered for this pane type; the first one stays active.
    #[error("pane type {type_name:?} is already registered")]
    DuplicatePane {
        /// The conflicting pane type name.
        type_name: String,
    },

    /// Pane type names must be non-empty.
    #[error("pane type name must not be empty")]
    EmptyPaneType,

    /// A default factory is already registered for this state key.
    #[error("default for state key {key:?} is already registered")]
    DuplicateDefault {
        /// The conflicting state key.
        key: String,
    },

    /// Diagnostics subscribers were supplied but no tokio runtime is available to drive them.
    #[error("diagnostics subscribers require a tokio runtime")]
    NoAsyncRuntime,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use panevisor::ConfigError;
    ///
    /// let err = ConfigError::DuplicatePane { type_name: "counter".into() };
    /// assert_eq!(err.as_label(), "config_duplicate_pane");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::DuplicatePane { .. } => "config_duplicate_pane",
            ConfigError::EmptyPaneType => "config_empty_pane_type",
            ConfigError::DuplicateDefault { .. } => "config_duplicate_default",
            ConfigError::NoAsyncRuntime => "config_no_async_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::DuplicatePane { type_name } => format!("duplicate pane: {type_name}"),
            ConfigError::EmptyPaneType => "empty pane type".to_string(),
            ConfigError::DuplicateDefault { key } => format!("duplicate default: {key}"),
            ConfigError::NoAsyncRuntime => "no tokio runtime for subscribers".to_string(),
        }
    }
}

/// # Errors produced by pane implementations.
///
/// A failing pane never affects other panes: the runtime revokes what the
/// failing instance owned, reports the error, and moves on.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaneError {
    /// The factory refused to build a controller for its container.
    #[error("factory failed: {error}")]
    Factory {
        /// The underlying error message.
        error: String,
    },

    /// The controller's `destroy` hook failed; cleanup still happened.
    #[error("destroy failed: {error}")]
    Destroy {
        /// The underlying error message.
        error: String,
    },

    /// Pane code panicked; the panic was caught.
    #[error("pane panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl PaneError {
    /// Shorthand for [`PaneError::Factory`].
    pub fn factory(error: impl Into<String>) -> Self {
        PaneError::Factory {
            error: error.into(),
        }
    }

    /// Shorthand for [`PaneError::Destroy`].
    pub fn destroy(error: impl Into<String>) -> Self {
        PaneError::Destroy {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use panevisor::PaneError;
    ///
    /// let err = PaneError::factory("missing data-key");
    /// assert_eq!(err.as_label(), "pane_factory_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PaneError::Factory { .. } => "pane_factory_failed",
            PaneError::Destroy { .. } => "pane_destroy_failed",
            PaneError::Panicked { .. } => "pane_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PaneError::Factory { error } => format!("factory: {error}"),
            PaneError::Destroy { error } => format!("destroy: {error}"),
            PaneError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(ConfigError::EmptyPaneType.as_label(), "config_empty_pane_type");
        assert_eq!(
            ConfigError::DuplicateDefault { key: "N".into() }.as_label(),
            "config_duplicate_default"
        );
        assert_eq!(PaneError::destroy("x").as_label(), "pane_destroy_failed");
        assert_eq!(
            PaneError::Panicked { info: "boom".into() }.as_message(),
            "panic: boom"
        );
    }

    #[test]
    fn display_includes_type_name() {
        let err = ConfigError::DuplicatePane {
            type_name: "counter".into(),
        };
        assert_eq!(err.to_string(), "pane type \"counter\" is already registered");
    }

    #[test]
    fn panic_message_handles_common_payloads() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*s), "static");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*owned), "owned");
        let other: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&*other), "unknown panic");
    }
}
