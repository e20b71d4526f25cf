//! Pane-facing publish/subscribe.
//!
//! ## Contents
//! - [`EventBus`] synchronous, snapshot-based fan-out keyed by topic string
//! - [`Subscription`] revocable, idempotent handle returned by [`EventBus::on`]
//! - [`Message`], [`Change`] what listeners receive
//! - [`CHANGE_TOPIC`], [`CHANGE_TOPIC_PREFIX`], [`key_topic`] the topic wire contract
//!
//! ## Topic contract
//! ```text
//! "state:change"      every slice write, any key
//! "state:change:<K>"  writes of key K only
//! anything else       application events, delivered as-is
//! ```
//! Subscribing to one never implicitly subscribes to the other.

mod bus;
mod message;
mod subscription;
mod topic;

pub use bus::{EventBus, Listener};
pub use message::{Change, Message};
pub use subscription::{Subscription, SubscriptionId};
pub use topic::{key_from_topic, key_topic, CHANGE_TOPIC, CHANGE_TOPIC_PREFIX};
