//! # Lane statistics.

use serde::{Deserialize, Serialize};

use crate::lanes::LaneMode;
use crate::tasks::TaskStatus;

/// Snapshot of a lane's load and cumulative outcomes.
///
/// `queued` and `running` are current values; every other counter is
/// cumulative since the lane was created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneStats {
    pub lane: String,
    pub mode: LaneMode,
    pub queued: usize,
    pub running: usize,
    pub submitted: u64,
    pub started: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub timed_out: u64,
    pub rejected: u64,
}

impl LaneStats {
    /// Tasks that reached a terminal state.
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed + self.cancelled + self.timed_out
    }
}

/// Cumulative counters kept inside the lane lock.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Counters {
    pub submitted: u64,
    pub started: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub timed_out: u64,
    pub rejected: u64,
}

impl Counters {
    pub fn record_terminal(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Succeeded => self.succeeded += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Cancelled => self.cancelled += 1,
            TaskStatus::TimedOut => self.timed_out += 1,
            TaskStatus::Queued | TaskStatus::Running => {}
        }
    }
}
