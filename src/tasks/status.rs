//! # Task lifecycle state machine.
//!
//! ```text
//! queued ──► running ──► succeeded
//!   │           ├──────► failed
//!   │           ├──────► timed_out
//!   │           └──────► cancelled   (cooperative exit after cancel)
//!   └──────────────────► cancelled   (never started)
//! ```
//!
//! ## Rules
//! - `Queued` is the only initial state.
//! - `Succeeded`, `Failed`, `Cancelled`, `TimedOut` are terminal; nothing leaves them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepted and waiting for a free slot in its lane.
    Queued,
    /// Holding a lane slot; the action is executing.
    Running,
    /// Action returned `Ok`.
    Succeeded,
    /// Action returned an error or panicked.
    Failed,
    /// Cancelled while queued, or exited cooperatively after a cancel signal.
    Cancelled,
    /// Deadline elapsed while running.
    TimedOut,
}

impl TaskStatus {
    /// Returns true for states with no outgoing transitions.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Queued | TaskStatus::Running)
    }

    /// Returns true if `self → next` is an edge of the state machine.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        match (self, next) {
            (TaskStatus::Queued, TaskStatus::Running | TaskStatus::Cancelled) => true,
            (
                TaskStatus::Running,
                TaskStatus::Succeeded
                | TaskStatus::Failed
                | TaskStatus::Cancelled
                | TaskStatus::TimedOut,
            ) => true,
            _ => false,
        }
    }

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
