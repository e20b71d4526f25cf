//! Runtime core: configuration, discovery and lifecycle.
//!
//! The public API from this module is [`Runtime`] (with [`RuntimeBuilder`]),
//! [`Config`] and [`DiscoveryReport`].
//!
//! Internal modules:
//! - [`lifecycle`]: mounts and destroys pane instances, owns their capabilities;
//! - [`discovery`]: finds marked containers and hands them to the lifecycle manager;
//! - [`runtime`]: ties registry, state store, pane bus and diagnostics together;
//! - [`builder`]: optional subscribers and an injected registry.

mod builder;
mod config;
mod discovery;
mod lifecycle;
mod runtime;

pub use builder::RuntimeBuilder;
pub use config::Config;
pub use discovery::{DiscoveryReport, Failed, Skipped};
pub use runtime::Runtime;
