//! # Process-wide registry.
//!
//! Convenience layer for callers that don't want to thread a
//! [`Registry`] through their code. Libraries and tests should prefer
//! constructing their own instance with [`Registry::new`].
//!
//! ```text
//! registry()        → existing instance, or a fresh default one
//! reset_registry()  → drop the instance; the next registry() is fresh and empty
//! install(reg)      → replace the instance with a preconfigured one
//! ```
//!
//! Tasks of a replaced instance keep running against it and report into its
//! own events and stats; they never touch the new instance.

use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::registry::Registry;
use crate::error::{Error, TaskError};
use crate::lanes::LaneKey;
use crate::tasks::TaskOptions;

static GLOBAL: RwLock<Option<Arc<Registry>>> = parking_lot::const_rwlock(None);

/// Returns the process-wide registry, creating it on first access.
pub fn registry() -> Arc<Registry> {
    if let Some(reg) = GLOBAL.read().as_ref() {
        return Arc::clone(reg);
    }
    let mut slot = GLOBAL.write();
    Arc::clone(slot.get_or_insert_with(Registry::with_defaults))
}

/// Discards the process-wide registry and all of its lanes.
///
/// Returns the discarded instance, if there was one.
pub fn reset_registry() -> Option<Arc<Registry>> {
    let old = GLOBAL.write().take();
    if old.is_some() {
        debug!("global registry reset");
    }
    old
}

/// Installs `reg` as the process-wide registry, returning the previous one.
pub fn install(reg: Arc<Registry>) -> Option<Arc<Registry>> {
    GLOBAL.write().replace(reg)
}

/// [`Registry::with_lane`] on the process-wide registry.
pub async fn with_lane<T, F, Fut>(
    key: impl Into<LaneKey>,
    options: TaskOptions,
    action: F,
) -> Result<T, Error>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    T: Send + 'static,
{
    registry().with_lane(key, options, action).await
}
