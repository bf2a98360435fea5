//! # Per-submission task options.
//!
//! [`TaskOptions`] travels with each submission and carries what the caller
//! may choose per task: the deadline and whether the task may share its lane
//! with other running tasks. Backpressure is deliberately **not** here; it is
//! fixed per lane at creation.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use lanevisor::TaskOptions;
//!
//! let opts = TaskOptions::new()
//!     .with_timeout(Some(Duration::from_secs(30)))
//!     .parallel(true);
//! assert!(opts.is_parallel());
//! assert_eq!(opts.timeout(), Some(Duration::from_secs(30)));
//! ```

use std::time::Duration;

/// Options attached to one submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskOptions {
    timeout: Option<Duration>,
    parallel: bool,
}

impl TaskOptions {
    /// Options with no explicit timeout (lane default applies) and serial admission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-task deadline.
    ///
    /// - `None` → inherit the lane's `default_timeout_ms`
    /// - `Some(Duration::ZERO)` → no deadline, even if the lane has one
    /// - `Some(d)` → deadline `d` measured from the moment the task starts
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Millisecond shorthand for [`with_timeout`](Self::with_timeout).
    pub fn with_timeout_ms(self, ms: u64) -> Self {
        self.with_timeout(Some(Duration::from_millis(ms)))
    }

    /// Requests admission up to the lane's `max_concurrency` instead of 1.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the explicit timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns true if the task asked for bounded-parallel admission.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Resolves the effective deadline against the lane default.
    pub(crate) fn resolve_timeout(&self, lane_default: Option<Duration>) -> Option<Duration> {
        match self.timeout {
            Some(d) if d.is_zero() => None,
            Some(d) => Some(d),
            None => lane_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_timeout_inherits_lane_default() {
        let lane = Some(Duration::from_secs(5));
        assert_eq!(TaskOptions::new().resolve_timeout(lane), lane);
        assert_eq!(TaskOptions::new().resolve_timeout(None), None);
    }

    #[test]
    fn test_explicit_zero_disables_deadline() {
        let opts = TaskOptions::new().with_timeout(Some(Duration::ZERO));
        assert_eq!(opts.resolve_timeout(Some(Duration::from_secs(5))), None);
    }

    #[test]
    fn test_explicit_timeout_wins() {
        let opts = TaskOptions::new().with_timeout_ms(50);
        assert_eq!(
            opts.resolve_timeout(Some(Duration::from_secs(5))),
            Some(Duration::from_millis(50))
        );
    }
}
