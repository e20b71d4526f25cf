//! Runtime diagnostics: types and broadcast bus.
//!
//! This module groups the diagnostic **data model** and the **bus** used to
//! publish/subscribe to events emitted by the registry, lifecycle manager,
//! state store and pane event bus.
//!
//! These are not the pane-facing topics (see [`pubsub`](crate::pubsub)); they
//! describe what the runtime itself is doing, for logging and metrics.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Runtime::register`, discovery, lifecycle manager, `StateStore`, `EventBus`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the runtime listener, which fans out to `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
