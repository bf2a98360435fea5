//! # Submitter-side task handle.

use std::sync::Arc;

use crate::error::TaskError;
use crate::lanes::Lane;
use crate::tasks::job::Outcome;
use crate::tasks::record::{TaskId, TaskRecord, TaskSnapshot};
use crate::tasks::TaskStatus;

/// Handle returned by [`Registry::submit`](crate::Registry::submit).
///
/// Remains usable after the task is terminal (status and snapshot queries),
/// and after a registry reset (it keeps its own lane alive).
pub struct TaskHandle<T> {
    record: Arc<TaskRecord>,
    lane: Arc<Lane>,
    outcome: Outcome<T>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(record: Arc<TaskRecord>, lane: Arc<Lane>, outcome: Outcome<T>) -> Self {
        Self {
            record,
            lane,
            outcome,
        }
    }

    pub fn id(&self) -> TaskId {
        self.record.id
    }

    pub fn status(&self) -> TaskStatus {
        self.record.status()
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.record.snapshot()
    }

    /// Cancels the task.
    ///
    /// A queued task becomes `cancelled` immediately and never starts. A running
    /// task only has its token signalled; the action decides when to exit.
    /// Returns false if the task was already terminal.
    pub fn cancel(&self) -> bool {
        self.lane.cancel(self.record.id)
    }

    /// Waits for the task's result.
    ///
    /// Dropping a handle without joining does not cancel the task.
    pub async fn join(self) -> Result<T, TaskError> {
        // The sender is only dropped unsent if the driver itself was torn down
        // (runtime shutdown); treat that as cancellation.
        self.outcome.await.unwrap_or(Err(TaskError::Cancelled))
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.record.id)
            .field("lane", &self.record.lane)
            .field("status", &self.record.status())
            .finish()
    }
}
