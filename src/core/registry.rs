//! # Lane registry: owns every lane and routes submissions to them.
//!
//! The registry maps [`LaneKey`]s to lanes, creating a lane lazily the first
//! time a key is used (with the config chosen by
//! [`RegistryConfig::config_for`]). All collaborator interaction goes through
//! it: submit, cancel, query, subscribe.
//!
//! ## Architecture
//! ```text
//! submit(key, opts, action)
//!     ├─► lane_or_create(key) ──► LaneCreated (first use only)
//!     ├─► TaskRecord::new(key, opts, resolved timeout)
//!     ├─► erase(action) ──► (Job, Settle, Outcome)
//!     └─► Lane::submit(Submission) ──► TaskHandle
//!
//! cancel(id) ──► Shared::lane_of(id) ──► Lane::cancel(id)
//! stats(key) ──► Lane::stats()
//! subscribe(sub) ──► SubscriberSet::add ──► Subscription
//! ```
//!
//! ## Rules
//! - A lane's config is fixed at creation; [`Registry::configure`] only works
//!   for keys that have no lane yet.
//! - Lanes are never removed from a live registry. Dropping the registry (or
//!   [`reset_registry`](crate::global::reset_registry) for the global one)
//!   orphans them; in-flight tasks keep running against the old instance.
//! - Every operation is synchronous except `submit` / `with_lane`, which may
//!   suspend on a full `Block` lane, and the helpers that await the result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::config::RegistryConfig;
use crate::core::scoped::LanedFn;
use crate::core::shared::Shared;
use crate::error::{Error, LaneError, TaskError};
use crate::events::{Event, EventKind};
use crate::lanes::{Lane, LaneConfig, LaneKey, LaneStats, Submission};
use crate::subscribers::{Subscribe, Subscription};
use crate::tasks::job::erase;
use crate::tasks::record::TaskRecord;
use crate::tasks::{TaskHandle, TaskId, TaskOptions, TaskSnapshot};

/// Registry of lanes.
///
/// # Example
/// ```rust
/// use lanevisor::{Registry, TaskError, TaskOptions};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), lanevisor::Error> {
/// let registry = Registry::with_defaults();
///
/// let out = registry
///     .with_lane("build", TaskOptions::new(), |_token| async {
///         Ok::<_, TaskError>(2 + 2)
///     })
///     .await?;
/// assert_eq!(out, 4);
///
/// let stats = registry.stats("build")?;
/// assert_eq!(stats.succeeded, 1);
/// # Ok(())
/// # }
/// ```
pub struct Registry {
    cfg: RegistryConfig,
    lanes: RwLock<HashMap<LaneKey, Arc<Lane>>>,
    shared: Arc<Shared>,
}

impl Registry {
    /// Creates an empty registry after validating `cfg`.
    pub fn new(cfg: RegistryConfig) -> Result<Arc<Self>, LaneError> {
        cfg.validate()?;
        Ok(Self::build(cfg))
    }

    /// Creates an empty registry with [`RegistryConfig::default`].
    pub fn with_defaults() -> Arc<Self> {
        Self::build(RegistryConfig::default())
    }

    fn build(cfg: RegistryConfig) -> Arc<Self> {
        let shared = Shared::new(cfg.bus_capacity_clamped());
        Arc::new(Self {
            cfg,
            lanes: RwLock::new(HashMap::new()),
            shared,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.cfg
    }

    /// Creates the lane `key` with an explicit config.
    ///
    /// Fails with `InvalidConfig` if `config` does not validate and with
    /// `LaneExists` if the lane was already created (explicitly or by a
    /// submission).
    pub fn configure(&self, key: impl Into<LaneKey>, config: LaneConfig) -> Result<(), LaneError> {
        let key = key.into();
        config.validate()?;

        let mut lanes = self.lanes.write();
        if lanes.contains_key(&key) {
            return Err(LaneError::LaneExists {
                lane: key.to_string(),
            });
        }
        let lane = self.create(key.clone(), config);
        lanes.insert(key, lane);
        Ok(())
    }

    /// Submits `action` to lane `key`, creating the lane if needed.
    ///
    /// On a full `Block` lane this suspends until a slot or queue position
    /// frees up; on a full `Reject` lane it fails with `QueueFull`. The
    /// returned handle resolves once the task is terminal.
    pub async fn submit<T, F, Fut>(
        &self,
        key: impl Into<LaneKey>,
        options: TaskOptions,
        action: F,
    ) -> Result<TaskHandle<T>, LaneError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
        T: Send + 'static,
    {
        let lane = self.lane_or_create(key.into());
        let (sub, handle) = Self::prepare(&lane, options, action);
        lane.submit(sub).await?;
        Ok(handle)
    }

    /// Like [`submit`](Self::submit), but never waits: a full queue fails with
    /// `QueueFull` whatever the lane's backpressure policy.
    ///
    /// Outside a tokio runtime this only works on a lane that already has one
    /// (created or first used inside a runtime); otherwise it fails with
    /// `NoRuntime`.
    pub fn try_submit<T, F, Fut>(
        &self,
        key: impl Into<LaneKey>,
        options: TaskOptions,
        action: F,
    ) -> Result<TaskHandle<T>, LaneError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
        T: Send + 'static,
    {
        let lane = self.lane_or_create(key.into());
        let (sub, handle) = Self::prepare(&lane, options, action);
        lane.try_submit(sub)?;
        Ok(handle)
    }

    /// Runs `action` in lane `key` and returns its result.
    ///
    /// The lane slot is held for exactly the duration of the action and is
    /// released on every exit path (success, error, panic, cancel, deadline).
    pub async fn with_lane<T, F, Fut>(
        &self,
        key: impl Into<LaneKey>,
        options: TaskOptions,
        action: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
        T: Send + 'static,
    {
        let handle = self.submit(key, options, action).await?;
        Ok(handle.join().await?)
    }

    /// Wraps `f` so that every call runs through [`with_lane`](Self::with_lane)
    /// on lane `key`.
    pub fn laned<I, T, F, Fut>(
        self: &Arc<Self>,
        key: impl Into<LaneKey>,
        options: TaskOptions,
        f: F,
    ) -> LanedFn<F>
    where
        F: Fn(I, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        LanedFn::new(Arc::clone(self), key.into(), options, f)
    }

    /// Cancels a live task.
    ///
    /// A queued task is cancelled at once; a running one has its token
    /// signalled. Fails with `TaskNotFound` for unknown or terminal tasks.
    /// Safe to call from any thread, inside a runtime or not.
    pub fn cancel(&self, id: TaskId) -> Result<(), LaneError> {
        let found = self
            .shared
            .lane_of(id)
            .is_some_and(|lane| lane.cancel(id));
        if found {
            Ok(())
        } else {
            Err(LaneError::TaskNotFound { task: id })
        }
    }

    /// Cancels every queued task of lane `key` and signals every running one.
    ///
    /// Returns how many tasks were affected.
    pub fn cancel_lane(&self, key: impl Into<LaneKey>) -> Result<usize, LaneError> {
        let lane = self.lane(&key.into())?;
        let n = lane.cancel_all();
        debug!(lane = %lane.key(), affected = n, "lane cancelled");
        Ok(n)
    }

    /// Snapshot of a live (queued or running) task.
    pub fn task(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.shared.lane_of(id).and_then(|lane| lane.task(id))
    }

    /// Load and outcome counters of lane `key`.
    pub fn stats(&self, key: impl Into<LaneKey>) -> Result<LaneStats, LaneError> {
        Ok(self.lane(&key.into())?.stats())
    }

    /// Stats of every lane, ordered by key.
    pub fn all_stats(&self) -> Vec<LaneStats> {
        let mut lanes: Vec<Arc<Lane>> = self.lanes.read().values().cloned().collect();
        lanes.sort_unstable_by(|a, b| a.key().cmp(b.key()));
        lanes.iter().map(|l| l.stats()).collect()
    }

    /// Returns sorted list of existing lane keys.
    pub fn lane_keys(&self) -> Vec<LaneKey> {
        let mut keys: Vec<LaneKey> = self.lanes.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Config lane `key` was created with.
    pub fn lane_config(&self, key: impl Into<LaneKey>) -> Result<LaneConfig, LaneError> {
        Ok(self.lane(&key.into())?.config().clone())
    }

    /// Attaches a subscriber. Must be called within a tokio runtime.
    ///
    /// Subscribing the same `Arc` again returns a handle to the existing
    /// subscription.
    pub fn subscribe(&self, sub: Arc<dyn Subscribe>) -> Subscription {
        let id = self.shared.subs.add(sub);
        Subscription::new(id, &self.shared.subs)
    }

    /// Raw receiver of every event published after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    fn lane(&self, key: &LaneKey) -> Result<Arc<Lane>, LaneError> {
        self.lanes
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| LaneError::LaneNotFound {
                lane: key.to_string(),
            })
    }

    fn lane_or_create(&self, key: LaneKey) -> Arc<Lane> {
        if let Some(lane) = self.lanes.read().get(&key) {
            return Arc::clone(lane);
        }
        let mut lanes = self.lanes.write();
        if let Some(lane) = lanes.get(&key) {
            return Arc::clone(lane);
        }
        let config = self.cfg.config_for(&key).clone();
        let lane = self.create(key.clone(), config);
        lanes.insert(key, Arc::clone(&lane));
        lane
    }

    /// Builds a lane and announces it. Caller holds the write lock.
    fn create(&self, key: LaneKey, config: LaneConfig) -> Arc<Lane> {
        debug!(
            lane = %key,
            mode = ?config.mode,
            max_concurrency = config.max_concurrency,
            max_queue_depth = config.max_queue_depth,
            backpressure = ?config.backpressure,
            "lane created"
        );
        self.shared
            .publish(Event::new(EventKind::LaneCreated).with_lane(key.to_string()));
        Lane::new(key, config, Arc::clone(&self.shared))
    }

    fn prepare<T, F, Fut>(
        lane: &Arc<Lane>,
        options: TaskOptions,
        action: F,
    ) -> (Submission, TaskHandle<T>)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
        T: Send + 'static,
    {
        let timeout = options.resolve_timeout(lane.config().default_timeout());
        let record = TaskRecord::new(lane.key().clone(), options, timeout);
        let (job, settle, outcome) = erase(action);
        let handle = TaskHandle::new(Arc::clone(&record), Arc::clone(lane), outcome);
        (
            Submission {
                record,
                job,
                settle,
            },
            handle,
        )
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("lanes", &self.lanes.read().len())
            .field("subscribers", &self.shared.subs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskStatus;

    #[tokio::test]
    async fn test_lane_created_lazily_with_preset() {
        let cfg = RegistryConfig::default().with_lane("llm", LaneConfig::bounded(3));
        let reg = Registry::new(cfg).unwrap();

        assert!(reg.lane_keys().is_empty());
        let h = reg
            .submit("llm", TaskOptions::new(), |_t| async { Ok::<_, TaskError>(()) })
            .await
            .unwrap();
        h.join().await.unwrap();

        assert_eq!(reg.lane_keys(), vec![LaneKey::named("llm")]);
        assert_eq!(reg.lane_config("llm").unwrap().max_concurrency, 3);
    }

    #[test]
    fn test_with_defaults_matches_new_with_default_config() {
        let a = Registry::with_defaults();
        let b = Registry::new(RegistryConfig::default()).unwrap();
        assert_eq!(a.config(), b.config());
        assert_eq!(a.config(), &RegistryConfig::default());
        assert!(a.lane_keys().is_empty());
    }

    #[test]
    fn test_lane_configured_off_runtime_picks_up_first_runtime() {
        let reg = Registry::with_defaults();
        reg.configure("late", LaneConfig::default()).unwrap();

        let err = reg
            .try_submit("late", TaskOptions::new(), |_t| async { Ok::<_, TaskError>(()) })
            .unwrap_err();
        assert_eq!(err, LaneError::NoRuntime { lane: "late".into() });
        assert_eq!(reg.stats("late").unwrap().submitted, 0);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let out = rt.block_on(reg.with_lane("late", TaskOptions::new(), |_t| async {
            Ok::<_, TaskError>(5)
        }));
        assert_eq!(out.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_configure_rejects_existing_lane() {
        let reg = Registry::with_defaults();
        reg.configure("build", LaneConfig::bounded(2)).unwrap();

        let err = reg.configure("build", LaneConfig::default()).unwrap_err();
        assert_eq!(err, LaneError::LaneExists { lane: "build".into() });

        let err = reg.configure("other", LaneConfig::bounded(0)).unwrap_err();
        assert_eq!(err.as_label(), "lane_invalid_config");
        assert!(reg.stats("other").is_err());
    }

    #[tokio::test]
    async fn test_cancel_unknown_task_is_not_found() {
        let reg = Registry::with_defaults();
        let h = reg
            .submit("x", TaskOptions::new(), |_t| async { Ok::<_, TaskError>(1) })
            .await
            .unwrap();
        let id = h.id();
        assert_eq!(h.join().await, Ok(1));

        assert_eq!(reg.cancel(id), Err(LaneError::TaskNotFound { task: id }));
        assert!(reg.task(id).is_none());
    }

    #[tokio::test]
    async fn test_task_snapshot_while_queued() {
        let reg = Registry::with_defaults();
        let gate = CancellationToken::new();
        let g = gate.clone();
        let first = reg
            .submit("s", TaskOptions::new(), move |_t| async move {
                g.cancelled().await;
                Ok::<_, TaskError>(())
            })
            .await
            .unwrap();
        let second = reg
            .submit("s", TaskOptions::new(), |_t| async { Ok::<_, TaskError>(()) })
            .await
            .unwrap();

        let snap = reg.task(second.id()).unwrap();
        assert_eq!(snap.status, TaskStatus::Queued);
        assert_eq!(snap.lane, LaneKey::named("s"));
        assert!(snap.started_at.is_none());

        gate.cancel();
        first.join().await.unwrap();
        second.join().await.unwrap();
    }
}
