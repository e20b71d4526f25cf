//! # Diagnostics subscribers.
//!
//! ```text
//! Lifecycle / StateStore / EventBus ── publish(Event) ──► Bus (broadcast)
//!                                                           │
//!                                              runtime listener task
//!                                                           │
//!                                                    SubscriberSet
//!                                        ┌──────────────┼──────────────┐
//!                                        ▼              ▼              ▼
//!                                    LogWriter       Metrics        Custom
//! ```
//!
//! Implement [`Subscribe`] and pass it to
//! [`RuntimeBuilder::with_subscribers`](crate::RuntimeBuilder::with_subscribers).

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
