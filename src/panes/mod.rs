//! # Pane abstractions.
//!
//! This module provides the pane-facing contract:
//! - [`PaneFactory`] builds one controller per container; [`PaneFn`] wraps a closure
//! - [`PaneController`] what a factory returns; its optional `destroy` hook
//! - [`Capabilities`] the only handle a pane gets: [`StateAccess`] + [`EventAccess`]
//! - [`PaneRegistry`] type name → factory, registered once per name
//! - [`PaneId`], [`PaneState`] instance identity and lifecycle state
//!
//! Panes cannot reach the registry, the lifecycle manager or other panes'
//! subscriptions; everything goes through their capabilities.

mod capabilities;
mod factory;
mod pane;
mod registry;

pub use capabilities::{Capabilities, EventAccess, EventAccessExt, StateAccess};
pub use factory::{PaneFactory, PaneFn, PaneRef};
pub use pane::{PaneController, PaneId, PaneState};
pub use registry::PaneRegistry;

pub(crate) use capabilities::ScopedCapabilities;
