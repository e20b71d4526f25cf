//! Host container model.
//!
//! A minimal, thread-safe element tree used for pane discovery and rendering.
//! It is deliberately not a DOM: elements carry a tag, string attributes, a text
//! body and children, plus named listeners that the host fires with
//! [`Document::dispatch`] (the way a browser delivers a click).
//!
//! - [`Document`] owns elements and element listeners
//! - [`ElementId`] index of one element in its document
//! - [`Container`] the handle a pane factory receives for its element

mod container;
mod document;

pub use container::Container;
pub use document::{DocEvent, DocListener, Document, ElementId, ListenerId};
