//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] that
//! fans lane events out to subscribers, and the [`Subscription`] handle
//! returned by [`Registry::subscribe`](crate::Registry::subscribe).
//!
//! ## Architecture
//! ```text
//! Lane transition ──► Registry shared sink ──┬──► Bus (raw broadcast receivers)
//!                                            └──► SubscriberSet::emit(&Event)
//!                                                      ├──► LogWriter
//!                                                      ├──► Metrics
//!                                                      └──► Custom ...
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub(crate) use subscriber_set::panic_message;
pub use subscriber_set::{SubscriberSet, Subscription};
