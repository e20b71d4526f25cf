//! Named state slices.
//!
//! ## Contents
//! - [`StateStore`] keyed slices with whole-value writes and change notification
//! - [`Defaults`] one default factory per key, materialized lazily on first read
//! - [`Generation`] per-key monotonic write counter stamped on notifications
//!
//! ## Write path
//! ```text
//! set(K, V)
//!   ├─► store V, generation(K) += 1        (lock released here)
//!   ├─► on_commit(generation)              (writer arms its echo guard)
//!   ├─► EventBus: "state:change"     { payload: V, change: {K, gen, writer} }
//!   └─► EventBus: "state:change:K"   { payload: V, change: {K, gen, writer} }
//! ```
//! Every `set` counts as a change, even if `V` equals the previous value.
//! Concurrent writers to one key: last write wins, no merge.

mod defaults;
mod generation;
mod store;

pub use defaults::{DefaultFn, Defaults};
pub use generation::Generation;
pub use store::StateStore;
