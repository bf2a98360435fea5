//! # Per-lane configuration.
//!
//! A [`LaneConfig`] is fixed when its lane is created; later submissions can
//! neither widen the concurrency bound nor switch the backpressure policy.
//!
//! ## Sentinel values
//! - `default_timeout_ms = 0` → no deadline
//! - `max_queue_depth = 0` → nothing waits in the FIFO; work either takes a
//!   free slot or hits the backpressure policy

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LaneError;
use crate::policies::BackpressurePolicy;

/// Execution mode of a lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaneMode {
    /// At most one running task (tasks flagged `parallel` excepted).
    #[default]
    Serial,
    /// Up to `max_concurrency` running tasks.
    BoundedParallel,
}

/// Configuration of one lane.
///
/// ## Field semantics
/// - `mode`: serial (cap 1) or bounded-parallel (cap `max_concurrency`)
/// - `max_concurrency`: hard upper bound on running tasks (`>= 1`)
/// - `max_queue_depth`: bound on pending tasks
/// - `backpressure`: what a full queue does to new submissions
/// - `default_timeout_ms`: deadline for tasks that don't set one (`0` = none)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    pub mode: LaneMode,
    pub max_concurrency: usize,
    pub max_queue_depth: usize,
    pub backpressure: BackpressurePolicy,
    pub default_timeout_ms: u64,
}

impl Default for LaneConfig {
    /// Default configuration:
    ///
    /// - `mode = Serial`
    /// - `max_concurrency = 1`
    /// - `max_queue_depth = 1024`
    /// - `backpressure = Block`
    /// - `default_timeout_ms = 0` (no timeout)
    fn default() -> Self {
        Self {
            mode: LaneMode::Serial,
            max_concurrency: 1,
            max_queue_depth: 1024,
            backpressure: BackpressurePolicy::Block,
            default_timeout_ms: 0,
        }
    }
}

impl LaneConfig {
    /// Serial lane with the given queue bound and policy.
    pub fn serial(max_queue_depth: usize, backpressure: BackpressurePolicy) -> Self {
        Self {
            max_queue_depth,
            backpressure,
            ..Self::default()
        }
    }

    /// Bounded-parallel lane running up to `max_concurrency` tasks.
    pub fn bounded(max_concurrency: usize) -> Self {
        Self {
            mode: LaneMode::BoundedParallel,
            max_concurrency,
            ..Self::default()
        }
    }

    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.max_queue_depth = depth;
        self
    }

    pub fn with_backpressure(mut self, policy: BackpressurePolicy) -> Self {
        self.backpressure = policy;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Checks the config before any task is accepted.
    pub fn validate(&self) -> Result<(), LaneError> {
        if self.max_concurrency == 0 {
            return Err(LaneError::invalid("max_concurrency must be >= 1"));
        }
        Ok(())
    }

    /// Returns the default per-task timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → deadline applied from task start
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.default_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.default_timeout_ms))
        }
    }

    /// Concurrency bound the lane's mode enforces for ordinary tasks.
    #[inline]
    pub fn effective_concurrency(&self) -> usize {
        match self.mode {
            LaneMode::Serial => 1,
            LaneMode::BoundedParallel => self.max_concurrency.max(1),
        }
    }

    /// Concurrency bound for one submission.
    #[inline]
    pub(crate) fn cap_for(&self, parallel: bool) -> usize {
        if parallel {
            self.max_concurrency.max(1)
        } else {
            self.effective_concurrency()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_serial_without_deadline() {
        let cfg = LaneConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.effective_concurrency(), 1);
        assert_eq!(cfg.default_timeout(), None);
        assert_eq!(cfg.backpressure, BackpressurePolicy::Block);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let cfg = LaneConfig {
            max_concurrency: 0,
            ..LaneConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.as_label(), "lane_invalid_config");
    }

    #[test]
    fn test_parallel_flag_selects_the_lane_bound() {
        let serial = LaneConfig {
            max_concurrency: 4,
            ..LaneConfig::default()
        };
        assert_eq!(serial.cap_for(false), 1);
        assert_eq!(serial.cap_for(true), 4);

        let bounded = LaneConfig::bounded(3);
        assert_eq!(bounded.cap_for(false), 3);
        assert_eq!(bounded.cap_for(true), 3);
    }

    #[test]
    fn test_timeout_sentinel() {
        let cfg = LaneConfig::default().with_default_timeout(Duration::from_millis(250));
        assert_eq!(cfg.default_timeout_ms, 250);
        assert_eq!(cfg.default_timeout(), Some(Duration::from_millis(250)));
    }
}
