//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for observability and UI collaborators.
//! Each subscriber is driven by a dedicated worker loop fed by a bounded queue
//! owned by the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries); they do **not** block
//!   lane progress nor other subscribers.
//! - Each subscriber **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, events for that
//!   subscriber are **dropped** and `SubscriberOverflow` is published.
//! - A panic inside `on_event` is caught and published as `SubscriberPanicked`;
//!   the worker keeps going with the next event.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use lanevisor::{Event, EventKind, Subscribe};
//!
//! struct TimeoutAlerts;
//!
//! #[async_trait]
//! impl Subscribe for TimeoutAlerts {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::TaskTimedOut {
//!             // page someone...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "timeout-alerts" }
//!     fn queue_capacity(&self) -> usize { 64 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
