//! # Drive one started task to its terminal state.
//!
//! Executes the task's action with its cancellation token, applies the
//! deadline, and reports exactly one terminal transition back to the lane.
//!
//! ## Event flow
//! ```text
//! Success:
//!   action → Ok(v)            → finish(Succeeded) → deliver v
//!
//! Failure:
//!   action → Err(e)           → finish(Failed)    → settle Err(e)
//!   action panics             → finish(Failed)    → settle Err(Execution)
//!
//! Cooperative cancel:
//!   token cancelled, action → Err(_)
//!                             → finish(Cancelled) → settle Err(Cancelled)
//!
//! Timeout:
//!   deadline fires → cancel token → finish(TimedOut) → settle Err(Timeout)
//!                  → action detached (keeps running until it observes the token)
//! ```
//!
//! ## Rules
//! - The action runs on its own tokio task, so a panic surfaces as a
//!   `JoinError` here instead of unwinding through the lane.
//! - The lane slot is released by `finish`, which happens **before** the
//!   submitter is woken.
//! - On timeout the driver does not wait for the action to exit.

use std::sync::Arc;

use tokio::task::JoinError;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TaskError;
use crate::lanes::Lane;
use crate::subscribers::panic_message;
use crate::tasks::TaskStatus;
use crate::tasks::job::{Delivery, Job, Settle};
use crate::tasks::record::TaskRecord;

/// Runs `job` for `record` and reports its outcome to `lane`.
pub(crate) async fn drive(
    lane: Arc<Lane>,
    record: Arc<TaskRecord>,
    job: Job,
    settle: Arc<dyn Settle>,
) {
    let mut action = tokio::spawn(job(record.token.clone()));

    let joined = match record.timeout {
        Some(dur) => match time::timeout(dur, &mut action).await {
            Ok(joined) => joined,
            Err(_elapsed) => {
                record.token.cancel();
                debug!(lane = %lane.key(), task = %record.id, timeout = ?dur, "deadline elapsed");
                let err = TaskError::Timeout { timeout: dur };
                lane.finish(&record, TaskStatus::TimedOut, Some(&err));
                settle.fail(err);
                return;
            }
        },
        None => action.await,
    };

    match classify(joined, &record.token) {
        Ok(deliver) => {
            lane.finish(&record, TaskStatus::Succeeded, None);
            deliver();
        }
        Err((status, err)) => {
            lane.finish(&record, status, Some(&err));
            settle.fail(err);
        }
    }
}

/// Maps the joined action result to a terminal status.
fn classify(
    joined: Result<Result<Delivery, TaskError>, JoinError>,
    token: &CancellationToken,
) -> Result<Delivery, (TaskStatus, TaskError)> {
    match joined {
        Ok(Ok(deliver)) => Ok(deliver),
        Ok(Err(TaskError::Cancelled)) => Err((TaskStatus::Cancelled, TaskError::Cancelled)),
        Ok(Err(_)) if token.is_cancelled() => Err((TaskStatus::Cancelled, TaskError::Cancelled)),
        Ok(Err(e)) => Err((TaskStatus::Failed, e)),
        Err(je) if je.is_panic() => {
            let info = panic_message(&*je.into_panic());
            Err((
                TaskStatus::Failed,
                TaskError::execution(format!("action panicked: {info}")),
            ))
        }
        Err(_aborted) => Err((TaskStatus::Cancelled, TaskError::Cancelled)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_after_cancel_is_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let res = classify(Ok(Err(TaskError::execution("interrupted"))), &token);
        assert!(matches!(res, Err((TaskStatus::Cancelled, TaskError::Cancelled))));
    }

    #[test]
    fn test_plain_error_is_failure() {
        let token = CancellationToken::new();
        let res = classify(Ok(Err(TaskError::execution("exit 1"))), &token);
        match res {
            Err((status, err)) => {
                assert_eq!(status, TaskStatus::Failed);
                assert_eq!(err, TaskError::execution("exit 1"));
            }
            Ok(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_panic_is_captured_as_execution_error() {
        let joined = tokio::spawn(async {
            panic!("kaboom");
            #[allow(unreachable_code)]
            Ok::<Delivery, TaskError>(Box::new(|| {}))
        })
        .await;
        let res = classify(joined, &CancellationToken::new());
        match res {
            Err((TaskStatus::Failed, TaskError::Execution { error })) => {
                assert!(error.contains("kaboom"), "got {error}");
            }
            _ => panic!("expected captured panic"),
        }
    }
}
