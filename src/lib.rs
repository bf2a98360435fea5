//! # lanevisor
//!
//! **Lanevisor** is a lane-based task queue for async Rust.
//!
//! Work is submitted to named *lanes*. Each lane runs its tasks in FIFO order
//! under a concurrency bound (one at a time for `serial` lanes, up to
//! `max_concurrency` for `bounded-parallel` ones), holds back excess work in a
//! bounded queue, and applies a per-lane backpressure policy when that queue
//! is full. It is designed as the concurrency core of agent runtimes: one
//! serial lane per session keeps turns ordered, while named lanes (`"build"`,
//! `"llm"`, ...) cap how much of a given kind of work runs at once.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     submit(key, opts, action)      cancel(id)      stats(key)      subscribe(sub)
//!                 │                      │               │                 │
//!                 ▼                      ▼               ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │  Registry                                                                 │
//! │  - lanes: LaneKey → Lane (created lazily, config fixed at creation)       │
//! │  - Shared: task index (TaskId → Lane), Bus, SubscriberSet                 │
//! └──────┬──────────────────┬──────────────────┬──────────────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ Lane "build" │   │ Lane "llm"   │   │ session:abc  │
//!     │ FIFO+running │   │ FIFO+running │   │ FIFO+running │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ admit()          │                  │
//!      ▼                  ▼                  ▼
//!   runner::drive      runner::drive      runner::drive     (one per started task)
//!      │                  │                  │
//!      │ Publishes: TaskQueued, TaskStarted, TaskSucceeded, TaskFailed,
//!      │            TaskCancelled, TaskTimedOut
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │        Bus (broadcast, raw receivers)  +  SubscriberSet (per-sub queues)  │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Task lifecycle
//! ```text
//! queued ──► running ──► succeeded
//!   │           ├──────► failed      (action error or panic)
//!   │           ├──────► cancelled   (token signalled, action exited with Err)
//!   │           └──────► timed_out   (deadline fired; slot freed at once)
//!   └──────────────────► cancelled   (removed before it ever started)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Registry**      | Own lanes, submit/cancel/query, scoped helpers.               | [`Registry`], [`LanedFn`], [`global`]       |
//! | **Lanes**         | Per-key FIFO with bounded concurrency and queue.              | [`LaneKey`], [`LaneConfig`], [`LaneStats`]  |
//! | **Policies**      | Backpressure governor.                                        | [`BackpressurePolicy`], [`admit`]           |
//! | **Tasks**         | Handles, options and the status state machine.                | [`TaskHandle`], [`TaskOptions`], [`TaskStatus`] |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, UIs).           | [`Subscribe`], [`Subscription`], [`Event`]  |
//! | **Errors**        | Typed admission and execution errors.                         | [`LaneError`], [`TaskError`], [`Error`]     |
//! | **Configuration** | Serde-loadable registry and lane settings.                    | [`RegistryConfig`]                          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use lanevisor::{LaneConfig, Registry, RegistryConfig, TaskError, TaskOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = RegistryConfig::default().with_lane("build", LaneConfig::bounded(2));
//!     let registry = Registry::new(cfg)?;
//!
//!     // Runs in the "build" lane; the token is signalled on cancel or deadline.
//!     let handle = registry
//!         .submit(
//!             "build",
//!             TaskOptions::new().with_timeout(Some(Duration::from_secs(5))),
//!             |token| async move {
//!                 if token.is_cancelled() {
//!                     return Err(TaskError::Cancelled);
//!                 }
//!                 Ok("built")
//!             },
//!         )
//!         .await?;
//!
//!     assert_eq!(handle.join().await?, "built");
//!     assert_eq!(registry.stats("build")?.succeeded, 1);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod lanes;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{LanedFn, Registry, RegistryConfig, global};
pub use error::{Error, LaneError, TaskError};
pub use events::{Event, EventKind};
pub use lanes::{LaneConfig, LaneKey, LaneMode, LaneStats};
pub use policies::{Admission, BackpressurePolicy, admit};
pub use subscribers::{Subscribe, SubscriberSet, Subscription};
pub use tasks::{TaskHandle, TaskId, TaskOptions, TaskSnapshot, TaskStatus};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
