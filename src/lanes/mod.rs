//! Lanes: named FIFO execution contexts with a concurrency bound.
//!
//! - [`LaneKey`] session id or explicit name
//! - [`LaneConfig`], [`LaneMode`] fixed per-lane limits and policy
//! - [`LaneStats`] load and outcome counters
//! - `Lane` the scheduler itself (crate-internal; reached through the registry)

mod config;
mod key;
mod lane;
mod stats;

pub use config::{LaneConfig, LaneMode};
pub use key::LaneKey;
pub(crate) use lane::{Lane, Submission};
pub use stats::LaneStats;
