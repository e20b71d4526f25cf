//! # panevisor
//!
//! **Panevisor** is a small reactive core for pages built from independently
//! authored UI fragments ("panes").
//!
//! Panes register by type name, get mounted into every container that declares
//! that type, share named state slices, and are notified when a slice changes.
//! A pane's own write never bounces back into its own listeners (echo
//! suppression), while every other pane watching the same slice updates normally.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//!   │ PaneFactory │    │ PaneFactory │    │ PaneFactory │
//!   │  "counter"  │    │   "chart"   │    │   "flash"   │
//!   └──────┬──────┘    └──────┬──────┘    └──────┬──────┘
//!          └──────────────────┼──────────────────┘
//!                             ▼
//!                     ┌───────────────┐   discover(document)   ┌──────────────┐
//!                     │ PaneRegistry  │◄───────────────────────│   Document   │
//!                     └───────┬───────┘                        │ [data-pane]  │
//!                             ▼                                └──────────────┘
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │  Runtime                                                                  │
//! │  - Lifecycle (mount / destroy, one instance per container)                │
//! │  - StateStore (keyed JSON slices, per-key write generation)               │
//! │  - EventBus (synchronous pub/sub, snapshot fan-out, panic isolation)      │
//! │  - Bus (diagnostics broadcast) ──► SubscriberSet ──► Subscribe impls      │
//! └──────┬─────────────────────────┬─────────────────────────┬────────────────┘
//!        ▼                         ▼                         ▼
//!  ┌───────────┐             ┌───────────┐             ┌───────────┐
//!  │ instance  │             │ instance  │             │ instance  │
//!  │ caps +    │             │ caps +    │             │ caps +    │
//!  │ EchoGuard │             │ EchoGuard │             │ EchoGuard │
//!  └───────────┘             └───────────┘             └───────────┘
//! ```
//!
//! ### Write path
//! ```text
//! caps.state().set("N", v)
//!   ├─► StateStore: value := v, generation(N) += 1         (g)
//!   ├─► writer's EchoGuard arms (N, g)
//!   ├─► EventBus "state:change"    ─► every listener except the writer's own
//!   ├─► EventBus "state:change:N"  ─► every listener except the writer's own
//!   └─► writer's EchoGuard disarms (N, g)
//! set returns after the whole fan-out ran.
//! ```
//!
//! ## Features
//! | Area             | Description                                               | Key types / traits                         |
//! |------------------|-----------------------------------------------------------|--------------------------------------------|
//! | **Panes**        | Register factories, mount them into containers.           | [`PaneFactory`], [`PaneFn`], [`Runtime`]   |
//! | **Capabilities** | The only handle a pane gets: state + events.              | [`Capabilities`], [`StateAccess`]          |
//! | **State**        | Keyed slices, defaults, write generations.                | [`StateStore`], [`Generation`]             |
//! | **Events**       | Generic and key-scoped topics plus application topics.    | [`EventBus`], [`Message`], [`Subscription`]|
//! | **Diagnostics**  | What the runtime is doing, for logs and metrics.          | [`Event`], [`Subscribe`]                   |
//! | **Errors**       | Typed configuration and pane errors.                      | [`ConfigError`], [`PaneError`]             |
//! | **Configuration**| Marker attributes, bus capacity, emit depth.              | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a `tracing`-backed diagnostics subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use panevisor::{Capabilities, Config, Container, Document, EventAccessExt, PaneError, Runtime};
//!
//! let rt = Runtime::new(Config::default());
//! rt.register_default("N", || json!({ "value": 0 })).unwrap();
//! rt.register_fn("label", |c: Container, caps: Arc<dyn Capabilities>| {
//!     let render = {
//!         let c = c.clone();
//!         move |v: &serde_json::Value| c.set_text(&v["value"].to_string())
//!     };
//!     render(&caps.state().get("N"));
//!     caps.events().on_key("N", move |msg| render(&msg.payload));
//!     Ok::<_, PaneError>(())
//! })
//! .unwrap();
//!
//! let doc = Arc::new(Document::new());
//! let el = doc.append_new(doc.root(), "div");
//! doc.set_attribute(el, "data-pane", "label");
//! rt.discover(&doc);
//!
//! rt.state().set("N", json!({ "value": 5 }));
//! assert_eq!(doc.text(el).as_deref(), Some("5"));
//! ```

mod core;
mod dom;
mod echo;
mod error;
mod events;
mod panes;
mod pubsub;
mod state;
mod subscribers;
mod sync;

// ---- Public re-exports ----

pub use crate::core::{Config, DiscoveryReport, Failed, Runtime, RuntimeBuilder, Skipped};
pub use dom::{Container, DocEvent, DocListener, Document, ElementId, ListenerId};
pub use echo::{Armed, EchoGuard};
pub use error::{ConfigError, PaneError};
pub use events::{Bus, Event, EventKind};
pub use panes::{
    Capabilities, EventAccess, EventAccessExt, PaneController, PaneFactory, PaneFn, PaneId,
    PaneRef, PaneRegistry, PaneState, StateAccess,
};
pub use pubsub::{
    key_from_topic, key_topic, Change, EventBus, Listener, Message, Subscription, SubscriptionId,
    CHANGE_TOPIC, CHANGE_TOPIC_PREFIX,
};
pub use state::{DefaultFn, Defaults, Generation, StateStore};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in `tracing` subscriber.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
