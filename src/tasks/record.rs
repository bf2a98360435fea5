//! # Shared per-task bookkeeping.
//!
//! A [`TaskRecord`] is created on admission and shared (via `Arc`) between the
//! lane, the registry's task index and the submitter's [`TaskHandle`](crate::TaskHandle).
//! All status changes go through [`TaskRecord::transition`], which enforces the
//! state machine and stamps timestamps; once terminal, the record is frozen.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::lanes::LaneKey;
use crate::tasks::{TaskOptions, TaskStatus};

/// Process-wide task id counter. Ids stay unique across registry resets.
static TASK_SEQ: AtomicU64 = AtomicU64::new(1);

/// Unique task identifier, assigned at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn next() -> Self {
        TaskId(TASK_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Point-in-time copy of a task's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub lane: LaneKey,
    pub status: TaskStatus,
    pub parallel: bool,
    pub timeout: Option<Duration>,
    pub created_at: SystemTime,
    pub started_at: Option<SystemTime>,
    pub completed_at: Option<SystemTime>,
    /// Terminal error message (failed / cancelled / timed out).
    pub error: Option<Arc<str>>,
}

#[derive(Debug)]
struct RecordState {
    status: TaskStatus,
    started_at: Option<SystemTime>,
    completed_at: Option<SystemTime>,
    error: Option<Arc<str>>,
}

/// Shared mutable state of one task.
#[derive(Debug)]
pub(crate) struct TaskRecord {
    pub id: TaskId,
    pub lane: LaneKey,
    pub options: TaskOptions,
    pub timeout: Option<Duration>,
    pub created_at: SystemTime,
    pub token: CancellationToken,
    state: Mutex<RecordState>,
}

impl TaskRecord {
    pub fn new(lane: LaneKey, options: TaskOptions, timeout: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            id: TaskId::next(),
            lane,
            options,
            timeout,
            created_at: SystemTime::now(),
            token: CancellationToken::new(),
            state: Mutex::new(RecordState {
                status: TaskStatus::Queued,
                started_at: None,
                completed_at: None,
                error: None,
            }),
        })
    }

    pub fn status(&self) -> TaskStatus {
        self.state.lock().status
    }

    /// Moves to `next` if the state machine allows it.
    ///
    /// Returns false (and changes nothing) on an illegal edge, which includes
    /// any attempt to leave a terminal state.
    pub fn transition(&self, next: TaskStatus, error: Option<Arc<str>>) -> bool {
        let mut st = self.state.lock();
        if !st.status.can_transition_to(next) {
            return false;
        }
        let now = SystemTime::now();
        st.status = next;
        if next == TaskStatus::Running {
            st.started_at = Some(now);
        }
        if next.is_terminal() {
            st.completed_at = Some(now);
            st.error = error;
        }
        true
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let st = self.state.lock();
        TaskSnapshot {
            id: self.id,
            lane: self.lane.clone(),
            status: st.status,
            parallel: self.options.is_parallel(),
            timeout: self.timeout,
            created_at: self.created_at,
            started_at: st.started_at,
            completed_at: st.completed_at,
            error: st.error.clone(),
        }
    }
}
