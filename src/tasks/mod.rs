//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`TaskId`] - unique id assigned at submission
//! - [`TaskStatus`] - lifecycle state machine
//! - [`TaskOptions`] - per-submission knobs (timeout, parallel admission)
//! - [`TaskHandle`] - submitter's view: status, cancel, join
//! - [`TaskSnapshot`] - point-in-time copy of a task

mod handle;
pub(crate) mod job;
mod options;
pub(crate) mod record;
mod status;

pub use handle::TaskHandle;
pub use options::TaskOptions;
pub use record::{TaskId, TaskSnapshot};
pub use status::TaskStatus;
