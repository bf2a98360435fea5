//! # Non-blocking event fan-out to a dynamic set of subscribers.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Isolation**: a slow or panicking subscriber doesn't affect others or the lanes
//! - **Per-subscriber FIFO**: each subscriber sees events in publish order
//! - **Dynamic**: subscribers may be added or removed at any time; a removed
//!   subscriber's worker drains what is already queued, then exits
//! - **No replay**: a new subscriber only sees events emitted after it joined
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};

use futures::FutureExt;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::warn;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    id: u64,
    name: &'static str,
    sub: Arc<dyn Subscribe>,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for event subscribers.
pub struct SubscriberSet {
    channels: RwLock<Vec<SubscriberChannel>>,
    next_id: AtomicU64,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates an empty set. Overflow and panic reports go to `bus`.
    #[must_use]
    pub fn new(bus: Bus) -> Self {
        Self {
            channels: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            bus,
        }
    }

    /// Adds a subscriber and spawns its worker. Must be called within a tokio runtime.
    ///
    /// Adding the same `Arc` again returns the existing id.
    pub fn add(&self, sub: Arc<dyn Subscribe>) -> u64 {
        let mut channels = self.channels.write();
        if let Some(existing) = channels
            .iter()
            .find(|c| std::ptr::addr_eq(Arc::as_ptr(&c.sub), Arc::as_ptr(&sub)))
        {
            return existing.id;
        }

        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        let cap = sub.queue_capacity().max(1);
        let name = sub.name();
        let (tx, rx) = mpsc::channel::<Arc<Event>>(cap);
        tokio::spawn(worker(Arc::clone(&sub), rx, self.bus.clone()));

        channels.push(SubscriberChannel {
            id,
            name,
            sub,
            sender: tx,
        });
        id
    }

    /// Removes a subscriber. Returns false if it was not present.
    pub fn remove(&self, id: u64) -> bool {
        let mut channels = self.channels.write();
        let before = channels.len();
        channels.retain(|c| c.id != id);
        channels.len() != before
    }

    /// Number of attached subscribers.
    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Emits an event to all subscribers (clones the event once).
    pub fn emit(&self, event: &Event) {
        let channels = self.channels.read();
        if channels.is_empty() {
            return;
        }
        let event = Arc::new(event.clone());
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in channels.iter() {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            // Overflow reports are not re-reported, or a stuck subscriber would loop.
            if !is_overflow_evt {
                warn!(subscriber = channel.name, reason, "subscriber dropped event");
                let overflow = Event::subscriber_overflow(channel.name, reason);
                self.bus.publish(overflow);
            }
        }
    }
}

async fn worker(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let fut = sub.on_event(ev.as_ref());

        if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            let info = panic_message(&*panic_err);
            warn!(subscriber = sub.name(), info = %info, "subscriber panicked");
            bus.publish(Event::subscriber_panicked(sub.name(), info));
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Handle to an attached subscriber.
///
/// Dropping it keeps the subscriber attached; call
/// [`unsubscribe`](Subscription::unsubscribe) to detach.
#[derive(Clone, Debug)]
pub struct Subscription {
    id: u64,
    set: Weak<SubscriberSet>,
}

impl Subscription {
    pub(crate) fn new(id: u64, set: &Arc<SubscriberSet>) -> Self {
        Self {
            id,
            set: Arc::downgrade(set),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Detaches the subscriber. Idempotent: returns true only on the call
    /// that actually removed it.
    pub fn unsubscribe(&self) -> bool {
        self.set.upgrade().is_some_and(|set| set.remove(self.id))
    }
}
