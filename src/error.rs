//! Error types used by the lane registry and by task execution.
//!
//! This module defines three enums:
//!
//! - [`LaneError`]: admission and lookup failures raised by the registry itself.
//! - [`TaskError`]: terminal failures of a single task (cancel, deadline, action error).
//! - [`Error`]: union of both, returned by the scoped helpers
//!   ([`Registry::with_lane`](crate::Registry::with_lane), [`LanedFn`](crate::LanedFn)).
//!
//! All of them provide `as_label` (stable snake_case label for logs/metrics)
//! and `as_message` (human-readable detail).

use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

use crate::tasks::TaskId;

/// # Errors produced by the lane registry.
///
/// These are raised synchronously by submission, configuration and query
/// operations. They never describe what happened *inside* a task.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaneError {
    /// Submission rejected: the lane's pending queue is at `max_queue_depth`.
    #[error("lane {lane:?} queue full (max_queue_depth={max_queue_depth})")]
    QueueFull {
        /// Lane the submission targeted.
        lane: String,
        /// Configured queue bound.
        max_queue_depth: usize,
    },

    /// Query against a lane key that was never created.
    #[error("lane {lane:?} not found")]
    LaneNotFound {
        /// Requested lane.
        lane: String,
    },

    /// Task id is unknown or the task already reached a terminal state.
    #[error("task {task} not found")]
    TaskNotFound {
        /// Requested task.
        task: TaskId,
    },

    /// Lane configuration failed validation.
    #[error("invalid lane config: {reason}")]
    InvalidConfig {
        /// What is wrong with it.
        reason: String,
    },

    /// Explicit configuration requested for a lane that already exists.
    #[error("lane {lane:?} already exists; its config is fixed at creation")]
    LaneExists {
        /// Existing lane.
        lane: String,
    },

    /// Submission made outside a tokio runtime to a lane that has never seen one.
    #[error("lane {lane:?} has no tokio runtime to run tasks on")]
    NoRuntime {
        /// Lane the submission targeted.
        lane: String,
    },
}

impl LaneError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lanevisor::LaneError;
    ///
    /// let err = LaneError::QueueFull { lane: "build".into(), max_queue_depth: 2 };
    /// assert_eq!(err.as_label(), "lane_queue_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LaneError::QueueFull { .. } => "lane_queue_full",
            LaneError::LaneNotFound { .. } => "lane_not_found",
            LaneError::TaskNotFound { .. } => "task_not_found",
            LaneError::InvalidConfig { .. } => "lane_invalid_config",
            LaneError::LaneExists { .. } => "lane_exists",
            LaneError::NoRuntime { .. } => "lane_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LaneError::QueueFull {
                lane,
                max_queue_depth,
            } => format!("queue full: lane={lane} depth={max_queue_depth}"),
            LaneError::LaneNotFound { lane } => format!("unknown lane: {lane}"),
            LaneError::TaskNotFound { task } => format!("unknown or finished task: {task}"),
            LaneError::InvalidConfig { reason } => format!("invalid config: {reason}"),
            LaneError::LaneExists { lane } => format!("lane already exists: {lane}"),
            LaneError::NoRuntime { lane } => format!("no tokio runtime: lane={lane}"),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        LaneError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// # Errors produced by task execution.
///
/// Attached to the task's terminal state and delivered to the submitter
/// through [`TaskHandle::join`](crate::TaskHandle::join).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task was cancelled, either while queued or cooperatively while running.
    #[error("task cancelled")]
    Cancelled,

    /// Task deadline elapsed before it reached a terminal state.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The action itself failed (returned an error or panicked).
    #[error("execution failed: {error}")]
    Execution {
        /// The underlying error message.
        error: String,
    },
}

impl TaskError {
    /// Wraps any displayable failure as [`TaskError::Execution`].
    ///
    /// # Example
    /// ```
    /// use lanevisor::TaskError;
    ///
    /// let err = TaskError::execution("exit status 2");
    /// assert_eq!(err.to_string(), "execution failed: exit status 2");
    /// ```
    pub fn execution(error: impl Display) -> Self {
        TaskError::Execution {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Cancelled => "task_cancelled",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Execution { .. } => "task_execution",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Cancelled => "task cancelled".to_string(),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Execution { error } => format!("error: {error}"),
        }
    }
}

/// Failure of a scoped submission: either the lane refused the task, or the
/// task ran and did not succeed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Admission or lookup failure.
    #[error(transparent)]
    Lane(#[from] LaneError),

    /// Terminal task failure.
    #[error(transparent)]
    Task(#[from] TaskError),
}

impl Error {
    /// Returns the label of the wrapped error.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::Lane(e) => e.as_label(),
            Error::Task(e) => e.as_label(),
        }
    }

    /// Returns the message of the wrapped error.
    pub fn as_message(&self) -> String {
        match self {
            Error::Lane(e) => e.as_message(),
            Error::Task(e) => e.as_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(TaskError::Cancelled.as_label(), "task_cancelled");
        assert_eq!(
            TaskError::Timeout {
                timeout: Duration::from_millis(50)
            }
            .as_label(),
            "task_timeout"
        );
        assert_eq!(
            LaneError::LaneNotFound { lane: "x".into() }.as_label(),
            "lane_not_found"
        );
    }

    #[test]
    fn test_error_wraps_both_sides() {
        let e: Error = LaneError::invalid("max_concurrency must be >= 1").into();
        assert_eq!(e.as_label(), "lane_invalid_config");

        let e: Error = TaskError::execution("boom").into();
        assert_eq!(e.to_string(), "execution failed: boom");
        assert_eq!(e.as_message(), "error: boom");
    }
}
