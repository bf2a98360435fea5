//! # Laned functions.
//!
//! [`LanedFn`] turns any async function into one whose invocations are
//! serialized (or bounded) by a lane, without callers touching the registry.
//!
//! ## Example
//! ```rust
//! use lanevisor::{Registry, TaskError, TaskOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), lanevisor::Error> {
//! let registry = Registry::with_defaults();
//! let shout = registry.laned("io", TaskOptions::new(), |s: String, _token| async move {
//!     Ok::<_, TaskError>(s.to_uppercase())
//! });
//!
//! assert_eq!(shout.call("hi".to_string()).await?, "HI");
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::registry::Registry;
use crate::error::{Error, TaskError};
use crate::lanes::LaneKey;
use crate::tasks::TaskOptions;

/// A function bound to one lane. Created by [`Registry::laned`].
///
/// Every [`call`](Self::call) is submitted as its own task; the function
/// receives the input and the task's cancellation token.
pub struct LanedFn<F> {
    registry: Arc<Registry>,
    key: LaneKey,
    options: TaskOptions,
    f: Arc<F>,
}

impl<F> LanedFn<F> {
    pub(crate) fn new(registry: Arc<Registry>, key: LaneKey, options: TaskOptions, f: F) -> Self {
        Self {
            registry,
            key,
            options,
            f: Arc::new(f),
        }
    }

    /// Lane every call is routed through.
    pub fn key(&self) -> &LaneKey {
        &self.key
    }

    pub fn options(&self) -> TaskOptions {
        self.options
    }

    /// Runs `f(input, token)` as a task in the bound lane and returns its result.
    pub async fn call<I, T, Fut>(&self, input: I) -> Result<T, Error>
    where
        F: Fn(I, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
        I: Send + 'static,
        T: Send + 'static,
    {
        let f = Arc::clone(&self.f);
        self.registry
            .with_lane(self.key.clone(), self.options, move |token| f(input, token))
            .await
    }
}

impl<F> Clone for LanedFn<F> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            key: self.key.clone(),
            options: self.options,
            f: Arc::clone(&self.f),
        }
    }
}

impl<F> std::fmt::Debug for LanedFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanedFn")
            .field("key", &self.key)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_calls_are_serialized_per_lane() {
        let reg = Registry::with_defaults();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));
        let work = reg.laned("serial", TaskOptions::new(), move |n: u32, _t| {
            let (a, p) = (Arc::clone(&a), Arc::clone(&p));
            async move {
                let now = a.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                a.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, TaskError>(n * 2)
            }
        });

        let calls = (0..4).map(|n| {
            let w = work.clone();
            async move { w.call(n).await }
        });
        let out = futures::future::join_all(calls).await;

        assert_eq!(
            out.into_iter().collect::<Result<Vec<_>, _>>().unwrap(),
            vec![0, 2, 4, 6]
        );
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(reg.stats("serial").unwrap().succeeded, 4);
    }

    #[tokio::test]
    async fn test_call_surfaces_task_error() {
        let reg = Registry::with_defaults();
        let fails = reg.laned("x", TaskOptions::new(), |_: (), _t| async {
            Err::<(), _>(TaskError::execution("nope"))
        });

        let err = fails.call(()).await.unwrap_err();
        assert_eq!(err, Error::Task(TaskError::execution("nope")));
    }
}
