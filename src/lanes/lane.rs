//! # Lane: FIFO queue plus a bounded set of running tasks.
//!
//! ## Architecture
//! ```text
//! offer(sub) ──► admit(running, pending, cap, depth, policy)
//!                 ├─ Start   ──► start() ──► runtime.spawn(runner::drive)
//!                 ├─ Enqueue ──► order.push_back(id), queued.insert(id)
//!                 ├─ Reject  ──► LaneError::QueueFull
//!                 └─ Wait    ──► blocked.push_back(sub, tx); caller awaits rx
//!
//! driver ──► finish(record, status) ──► running.remove ──► pump()
//!                                                           ├─ start() FIFO heads
//!                                                           └─ admit oldest blocked, tx.send(())
//! ```
//!
//! ## Rules
//! - `running.len() <= config.max_concurrency` at all times.
//! - Tasks start in submission order: `pump()` only ever starts the FIFO head.
//! - All mutations of `order` / `queued` / `running` / `counters` happen under
//!   one lock; events are published inside it, so a lane's events follow its
//!   transition order. No lock is held across an `.await`.
//! - Cancelling a queued task removes it from `queued` in O(1); its id is left
//!   in `order` as a tombstone and skipped when it reaches the head.
//! - Blocked submitters are admitted in arrival order. While any is parked, a
//!   new `Block` submission parks behind it and a `Reject` one is refused.
//! - Drivers are spawned on the runtime handle captured by the lane, so a
//!   queued cancel that starts the next head may run on any thread.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::core::{Shared, runner};
use crate::error::{LaneError, TaskError};
use crate::events::Event;
use crate::lanes::stats::Counters;
use crate::lanes::{LaneConfig, LaneKey, LaneStats};
use crate::policies::{Admission, BackpressurePolicy, admit};
use crate::tasks::job::{Job, Settle};
use crate::tasks::record::TaskRecord;
use crate::tasks::{TaskId, TaskSnapshot, TaskStatus};

/// A task that has not been admitted yet, or is waiting in the FIFO.
pub(crate) struct Submission {
    pub record: Arc<TaskRecord>,
    pub job: Job,
    pub settle: Arc<dyn Settle>,
}

enum Offer {
    Accepted,
    Parked(oneshot::Receiver<()>),
}

/// A `Block` submitter waiting for a queue position.
struct Blocked {
    sub: Submission,
    admitted: oneshot::Sender<()>,
}

#[derive(Default)]
struct LaneState {
    order: VecDeque<TaskId>,
    queued: HashMap<TaskId, Submission>,
    running: HashMap<TaskId, Arc<TaskRecord>>,
    blocked: VecDeque<Blocked>,
    runtime: Option<Handle>,
    counters: Counters,
}

/// One lane. Owned by the [`Registry`](crate::Registry); collaborators only
/// reach it through registry operations and task handles.
pub struct Lane {
    key: LaneKey,
    label: Arc<str>,
    config: LaneConfig,
    shared: Arc<Shared>,
    state: Mutex<LaneState>,
}

impl Lane {
    /// Creates a lane. `config` must already be validated.
    ///
    /// Captures the current tokio runtime if there is one; otherwise the
    /// first submission made inside a runtime supplies it.
    pub(crate) fn new(key: LaneKey, config: LaneConfig, shared: Arc<Shared>) -> Arc<Self> {
        let label: Arc<str> = key.to_string().into();
        let state = LaneState {
            runtime: Handle::try_current().ok(),
            ..LaneState::default()
        };
        Arc::new(Self {
            key,
            label,
            config,
            shared,
            state: Mutex::new(state),
        })
    }

    pub fn key(&self) -> &LaneKey {
        &self.key
    }

    pub fn config(&self) -> &LaneConfig {
        &self.config
    }

    /// Admits a submission, suspending the caller while a `Block` lane is full.
    ///
    /// A suspended submitter is handed the next free queue position in the
    /// order it arrived. Dropping this future while parked withdraws the
    /// submission unless it was already admitted.
    pub(crate) async fn submit(self: &Arc<Self>, sub: Submission) -> Result<(), LaneError> {
        match self.offer(sub, self.config.backpressure)? {
            Offer::Accepted => Ok(()),
            Offer::Parked(admitted) => admitted.await.map_err(|_| self.queue_full()),
        }
    }

    /// Admits a submission without ever waiting: a full queue is `QueueFull`
    /// whatever the lane's policy.
    pub(crate) fn try_submit(self: &Arc<Self>, sub: Submission) -> Result<(), LaneError> {
        match self.offer(sub, BackpressurePolicy::Reject)? {
            Offer::Accepted => Ok(()),
            Offer::Parked(_) => Err(self.queue_full()),
        }
    }

    fn offer(
        self: &Arc<Self>,
        sub: Submission,
        policy: BackpressurePolicy,
    ) -> Result<Offer, LaneError> {
        let mut st = self.state.lock();
        if st.runtime.is_none() {
            st.runtime = Some(Handle::try_current().map_err(|_| LaneError::NoRuntime {
                lane: self.label.to_string(),
            })?);
        }

        let verdict = if st.blocked.is_empty() {
            self.verdict(&st, &sub, policy)
        } else {
            match policy {
                BackpressurePolicy::Reject => Admission::Reject,
                BackpressurePolicy::Block => Admission::Wait,
            }
        };

        match verdict {
            Admission::Start | Admission::Enqueue => {
                self.accept(&mut st, sub, verdict);
                Ok(Offer::Accepted)
            }
            Admission::Reject => {
                st.counters.rejected += 1;
                warn!(
                    lane = %self.label,
                    running = st.running.len(),
                    pending = st.queued.len(),
                    max_queue_depth = self.config.max_queue_depth,
                    "submission rejected: queue full"
                );
                Err(self.queue_full())
            }
            Admission::Wait => {
                let (admitted, rx) = oneshot::channel();
                debug!(
                    lane = %self.label,
                    task = %sub.record.id,
                    blocked = st.blocked.len() + 1,
                    "submitter blocked: queue full"
                );
                st.blocked.push_back(Blocked { sub, admitted });
                Ok(Offer::Parked(rx))
            }
        }
    }

    fn verdict(&self, st: &LaneState, sub: &Submission, policy: BackpressurePolicy) -> Admission {
        admit(
            st.running.len(),
            st.queued.len(),
            self.config.cap_for(sub.record.options.is_parallel()),
            self.config.max_queue_depth,
            policy,
        )
    }

    /// Tracks an admitted submission and starts or enqueues it per `verdict`.
    fn accept(self: &Arc<Self>, st: &mut LaneState, sub: Submission, verdict: Admission) {
        let id = sub.record.id;
        st.counters.submitted += 1;
        self.shared.track(id, self);
        self.publish(Event::transition(TaskStatus::Queued).with_task(id));
        if verdict == Admission::Start {
            self.start(st, sub);
        } else {
            debug!(lane = %self.label, task = %id, depth = st.queued.len() + 1, "task queued");
            st.order.push_back(id);
            st.queued.insert(id, sub);
        }
    }

    /// Moves a task into a running slot and spawns its driver.
    fn start(self: &Arc<Self>, st: &mut LaneState, sub: Submission) {
        let Submission {
            record,
            job,
            settle,
        } = sub;
        // `offer` sets the handle before anything is admitted.
        let Some(runtime) = st.runtime.clone() else {
            warn!(lane = %self.label, task = %record.id, "no runtime to start task on");
            return;
        };
        if !record.transition(TaskStatus::Running, None) {
            return;
        }
        st.counters.started += 1;
        st.running.insert(record.id, Arc::clone(&record));

        let mut ev = Event::transition(TaskStatus::Running).with_task(record.id);
        if let Some(timeout) = record.timeout {
            ev = ev.with_timeout(timeout);
        }
        self.publish(ev);
        debug!(lane = %self.label, task = %record.id, running = st.running.len(), "task started");

        runtime.spawn(runner::drive(Arc::clone(self), record, job, settle));
    }

    /// Starts pending tasks from the head of the FIFO while they fit, then
    /// hands freed queue positions to blocked submitters, oldest first.
    fn pump(self: &Arc<Self>, st: &mut LaneState) {
        while let Some(&head) = st.order.front() {
            let Some(next) = st.queued.get(&head) else {
                st.order.pop_front();
                continue;
            };
            let cap = self.config.cap_for(next.record.options.is_parallel());
            if st.running.len() >= cap {
                break;
            }
            st.order.pop_front();
            if let Some(sub) = st.queued.remove(&head) {
                self.start(st, sub);
            }
        }

        while let Some(front) = st.blocked.front() {
            if front.admitted.is_closed() {
                // Submitter gave up waiting.
                st.blocked.pop_front();
                continue;
            }
            let verdict = self.verdict(st, &front.sub, BackpressurePolicy::Block);
            if !matches!(verdict, Admission::Start | Admission::Enqueue) {
                break;
            }
            let Some(Blocked { sub, admitted }) = st.blocked.pop_front() else {
                break;
            };
            self.accept(st, sub, verdict);
            let _ = admitted.send(());
        }
    }

    /// Records the terminal transition of a running task and frees its slot.
    ///
    /// Returns false if the task no longer holds a slot (already finished).
    pub(crate) fn finish(
        self: &Arc<Self>,
        record: &TaskRecord,
        status: TaskStatus,
        error: Option<&TaskError>,
    ) -> bool {
        let mut st = self.state.lock();
        if st.running.remove(&record.id).is_none() {
            return false;
        }
        let message: Option<Arc<str>> = error.map(|e| e.to_string().into());
        record.transition(status, message.clone());
        st.counters.record_terminal(status);
        self.shared.untrack(record.id);

        let mut ev = Event::transition(status).with_task(record.id);
        if let Some(msg) = message {
            ev = ev.with_error(msg);
        }
        if status == TaskStatus::TimedOut
            && let Some(timeout) = record.timeout
        {
            ev = ev.with_timeout(timeout);
        }
        self.publish(ev);
        debug!(lane = %self.label, task = %record.id, %status, "task finished");

        self.pump(&mut st);
        true
    }

    /// Cancels a task of this lane.
    ///
    /// Queued: removed and marked `cancelled` at once, without ever starting.
    /// Running: its token is signalled; the driver records the outcome when the
    /// action exits (or when its deadline fires). Returns false if the task is
    /// not live in this lane.
    pub(crate) fn cancel(self: &Arc<Self>, id: TaskId) -> bool {
        let mut st = self.state.lock();
        if let Some(sub) = st.queued.remove(&id) {
            self.cancel_queued(&mut st, sub);
            self.pump(&mut st);
            true
        } else if let Some(record) = st.running.get(&id) {
            debug!(lane = %self.label, task = %id, "cancel signalled to running task");
            record.token.cancel();
            true
        } else {
            false
        }
    }

    /// Cancels every queued task and signals every running one.
    ///
    /// Blocked submitters are not tasks yet; they take the freed queue
    /// positions. Returns how many tasks were affected.
    pub(crate) fn cancel_all(self: &Arc<Self>) -> usize {
        let mut st = self.state.lock();
        let ids: Vec<TaskId> = st.order.drain(..).collect();
        let mut affected = 0;
        for id in ids {
            if let Some(sub) = st.queued.remove(&id) {
                self.cancel_queued(&mut st, sub);
                affected += 1;
            }
        }
        for record in st.running.values() {
            record.token.cancel();
            affected += 1;
        }
        self.pump(&mut st);
        affected
    }

    fn cancel_queued(&self, st: &mut LaneState, sub: Submission) {
        let id = sub.record.id;
        let err = TaskError::Cancelled;
        sub.record
            .transition(TaskStatus::Cancelled, Some(err.to_string().into()));
        st.counters.cancelled += 1;
        self.shared.untrack(id);
        self.publish(
            Event::transition(TaskStatus::Cancelled)
                .with_task(id)
                .with_error(err.to_string()),
        );
        debug!(lane = %self.label, task = %id, "queued task cancelled");
        sub.settle.fail(err);

        // Keep tombstones from piling up behind a long-running head.
        if st.order.len() > 2 * st.queued.len() + 16 {
            let queued = &st.queued;
            st.order.retain(|id| queued.contains_key(id));
        }
    }

    /// Snapshot of a live task of this lane.
    pub(crate) fn task(&self, id: TaskId) -> Option<TaskSnapshot> {
        let st = self.state.lock();
        st.queued
            .get(&id)
            .map(|sub| sub.record.snapshot())
            .or_else(|| st.running.get(&id).map(|r| r.snapshot()))
    }

    pub fn stats(&self) -> LaneStats {
        let st = self.state.lock();
        let c = st.counters;
        LaneStats {
            lane: self.label.to_string(),
            mode: self.config.mode,
            queued: st.queued.len(),
            running: st.running.len(),
            submitted: c.submitted,
            started: c.started,
            succeeded: c.succeeded,
            failed: c.failed,
            cancelled: c.cancelled,
            timed_out: c.timed_out,
            rejected: c.rejected,
        }
    }

    fn publish(&self, ev: Event) {
        self.shared.publish(ev.with_lane(Arc::clone(&self.label)));
    }

    fn queue_full(&self) -> LaneError {
        LaneError::QueueFull {
            lane: self.label.to_string(),
            max_queue_depth: self.config.max_queue_depth,
        }
    }
}

impl std::fmt::Debug for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lane")
            .field("key", &self.key)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
