//! # LogWriter: event-to-tracing bridge
//!
//! A minimal subscriber that renders every [`Event`] as one `tracing` line.
//! Install a `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output
//! ```text
//! INFO lanevisor: [queued] lane=build task=task-7
//! INFO lanevisor: [started] lane=build task=task-7 timeout_ms=Some(50)
//! INFO lanevisor: [timed-out] lane=build task=task-7 timeout_ms=Some(50)
//! INFO lanevisor: [failed] lane=build task=task-8 err="execution failed: exit 2"
//! ```

use async_trait::async_trait;
use tracing::info;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let lane = e.lane.as_deref().unwrap_or("-");
        let task = e.task.map(|t| t.to_string()).unwrap_or_default();
        let err = e.error.as_deref().unwrap_or("");
        let subscriber = e.subscriber.unwrap_or("-");
        match e.kind {
            EventKind::TaskQueued => info!("[queued] lane={lane} task={task}"),
            EventKind::TaskStarted => {
                info!("[started] lane={lane} task={task} timeout_ms={:?}", e.timeout_ms)
            }
            EventKind::TaskSucceeded => info!("[succeeded] lane={lane} task={task}"),
            EventKind::TaskFailed => info!("[failed] lane={lane} task={task} err={err:?}"),
            EventKind::TaskCancelled => info!("[cancelled] lane={lane} task={task}"),
            EventKind::TaskTimedOut => {
                info!("[timed-out] lane={lane} task={task} timeout_ms={:?}", e.timeout_ms)
            }
            EventKind::LaneCreated => info!("[lane-created] lane={lane}"),
            EventKind::SubscriberOverflow => {
                info!("[subscriber-overflow] subscriber={subscriber} reason={err:?}")
            }
            EventKind::SubscriberPanicked => {
                info!("[subscriber-panicked] subscriber={subscriber} info={err}")
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
