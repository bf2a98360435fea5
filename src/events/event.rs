//! # Lane and task events.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Task transitions**: queued, started, and the four terminal outcomes
//! - **Lane events**: lazily created lanes
//! - **Subscriber events**: overflow and panics in subscriber workers
//!
//! ## Ordering guarantees
//! Each event has a process-wide unique sequence number (`seq`) that increases
//! monotonically. Events of one lane are published in transition order.
//!
//! ## Example
//! ```rust
//! use lanevisor::{Event, EventKind, TaskStatus};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_lane("build")
//!     .with_error("exit status 2");
//!
//! assert_eq!(ev.status(), Some(TaskStatus::Failed));
//! assert_eq!(ev.lane.as_deref(), Some("build"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::tasks::{TaskId, TaskStatus};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task transitions ===
    /// Submission accepted; task is tracked (published even if it starts at once).
    ///
    /// Sets: `task`, `lane`
    TaskQueued,

    /// Task took a running slot.
    ///
    /// Sets: `task`, `lane`, `timeout_ms` (effective deadline, if any)
    TaskStarted,

    /// Action returned `Ok`.
    ///
    /// Sets: `task`, `lane`
    TaskSucceeded,

    /// Action returned an error or panicked.
    ///
    /// Sets: `task`, `lane`, `error`
    TaskFailed,

    /// Cancelled while queued, or exited after its cancel signal.
    ///
    /// Sets: `task`, `lane`, `error`
    TaskCancelled,

    /// Deadline elapsed; the slot was released.
    ///
    /// Sets: `task`, `lane`, `timeout_ms`, `error`
    TaskTimedOut,

    // === Lane events ===
    /// Lane created on first use (or by explicit configuration).
    ///
    /// Sets: `lane`
    LaneCreated,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subscriber`, `error` (reason)
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `subscriber`, `error` (panic message)
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Task the event is about.
    pub task: Option<TaskId>,
    /// Lane key (display form).
    pub lane: Option<Arc<str>>,
    /// Name of the subscriber a subscriber event is about.
    pub subscriber: Option<&'static str>,
    /// Task deadline in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable error or reason.
    pub error: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            lane: None,
            subscriber: None,
            timeout_ms: None,
            error: None,
        }
    }

    /// Task transition event for the given status.
    pub(crate) fn transition(status: TaskStatus) -> Self {
        let kind = match status {
            TaskStatus::Queued => EventKind::TaskQueued,
            TaskStatus::Running => EventKind::TaskStarted,
            TaskStatus::Succeeded => EventKind::TaskSucceeded,
            TaskStatus::Failed => EventKind::TaskFailed,
            TaskStatus::Cancelled => EventKind::TaskCancelled,
            TaskStatus::TimedOut => EventKind::TaskTimedOut,
        };
        Event::new(kind)
    }

    #[inline]
    pub fn with_task(mut self, task: TaskId) -> Self {
        self.task = Some(task);
        self
    }

    #[inline]
    pub fn with_lane(mut self, lane: impl Into<Arc<str>>) -> Self {
        self.lane = Some(lane.into());
        self
    }

    #[inline]
    pub fn with_subscriber(mut self, subscriber: &'static str) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Task status this event reports, if it is a task transition.
    pub fn status(&self) -> Option<TaskStatus> {
        match self.kind {
            EventKind::TaskQueued => Some(TaskStatus::Queued),
            EventKind::TaskStarted => Some(TaskStatus::Running),
            EventKind::TaskSucceeded => Some(TaskStatus::Succeeded),
            EventKind::TaskFailed => Some(TaskStatus::Failed),
            EventKind::TaskCancelled => Some(TaskStatus::Cancelled),
            EventKind::TaskTimedOut => Some(TaskStatus::TimedOut),
            EventKind::LaneCreated
            | EventKind::SubscriberOverflow
            | EventKind::SubscriberPanicked => None,
        }
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_error(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_error(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::LaneCreated);
        let b = Event::new(EventKind::LaneCreated);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_transition_round_trips_status() {
        for status in [
            TaskStatus::Queued,
            TaskStatus::Running,
            TaskStatus::Succeeded,
            TaskStatus::Failed,
            TaskStatus::Cancelled,
            TaskStatus::TimedOut,
        ] {
            assert_eq!(Event::transition(status).status(), Some(status));
        }
        assert_eq!(Event::new(EventKind::LaneCreated).status(), None);
    }

    #[test]
    fn test_subscriber_events_leave_lane_unset() {
        let ev = Event::subscriber_overflow("metrics", "full");
        assert_eq!(ev.subscriber, Some("metrics"));
        assert!(ev.lane.is_none());
        assert_eq!(ev.error.as_deref(), Some("subscriber=metrics reason=full"));

        let ev = Event::subscriber_panicked("audit", "boom".into());
        assert_eq!(ev.subscriber, Some("audit"));
        assert!(ev.lane.is_none());
    }

    #[test]
    fn test_timeout_is_clamped() {
        let ev = Event::new(EventKind::TaskTimedOut).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));
    }
}
