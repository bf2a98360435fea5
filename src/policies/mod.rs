//! Admission policies.
//!
//! ## Contents
//! - [`BackpressurePolicy`] what a full lane does with new work (reject / block)
//! - [`admit`] the governor: a pure function of lane load and config
//! - [`Admission`] its verdict
//!
//! ## Quick wiring
//! ```text
//! Registry::submit ──► Lane::offer ──► admit(running, pending, cap, depth, policy)
//!                                        ├─ Start   → slot taken, driver spawned
//!                                        ├─ Enqueue → pending FIFO
//!                                        ├─ Reject  → LaneError::QueueFull
//!                                        └─ Wait    → submitter parks on the lane
//! ```

mod backpressure;

pub use backpressure::{Admission, BackpressurePolicy, admit};
