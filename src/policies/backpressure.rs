//! # Backpressure governor.
//!
//! Decides what happens to a submission given only the lane's current load
//! and its fixed config. It never looks at the task itself.
//!
//! ## Decision table
//! ```text
//! pending == 0 && running < cap          → Start
//! pending <  max_queue_depth             → Enqueue
//! queue full, policy = Reject            → Reject   (QueueFull, never tracked)
//! queue full, policy = Block             → Wait     (caller suspends, retries)
//! ```
//!
//! ## Rules
//! - A submission never starts while older tasks are pending, even if a slot is
//!   free for it: tasks begin in submission order.
//! - The policy belongs to the lane; a caller cannot pick another one per task.

use serde::{Deserialize, Serialize};

/// What to do with a submission when the lane's pending queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Fail fast with `QueueFull`.
    Reject,
    /// Suspend the submitter until the queue has room (default).
    #[default]
    Block,
}

/// Outcome of one governor evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Take a running slot now.
    Start,
    /// Append to the pending FIFO.
    Enqueue,
    /// Refuse the submission.
    Reject,
    /// Retry once the lane has made progress.
    Wait,
}

/// Evaluates the governor.
///
/// `cap` is the concurrency bound that applies to *this* submission
/// (1 for serial admission, `max_concurrency` for parallel).
pub fn admit(
    running: usize,
    pending: usize,
    cap: usize,
    max_queue_depth: usize,
    policy: BackpressurePolicy,
) -> Admission {
    if pending == 0 && running < cap {
        return Admission::Start;
    }
    if pending < max_queue_depth {
        return Admission::Enqueue;
    }
    match policy {
        BackpressurePolicy::Reject => Admission::Reject,
        BackpressurePolicy::Block => Admission::Wait,
    }
}
