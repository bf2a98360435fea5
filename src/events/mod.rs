//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Lane` (every task transition), `Registry` (lane creation),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: raw receivers from `Registry::events()`, and the
//!   `SubscriberSet` fan-out to `Subscribe` implementations.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
