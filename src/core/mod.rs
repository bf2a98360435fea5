//! Registry core: lane ownership, task driving and the global instance.
//!
//! The public API from this module is [`Registry`] (with its
//! [`RegistryConfig`]), [`LanedFn`] and the [`global`] helpers.
//!
//! Internal modules:
//! - [`runner`]: drives one started task with timeout/cancellation to its terminal state;
//! - [`registry`]: owns lanes, routes submissions, queries and subscriptions;
//! - [`scoped`]: functions bound to a lane;
//! - [`shared`]: event sinks and task index shared by a registry and its lanes.

mod config;
pub mod global;
mod registry;
pub(crate) mod runner;
mod scoped;
mod shared;

pub use config::RegistryConfig;
pub use registry::Registry;
pub use scoped::LanedFn;
pub(crate) use shared::Shared;
