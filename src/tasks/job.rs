//! # Type-erased task actions.
//!
//! Lanes hold tasks of arbitrary output types in one FIFO, so each submitted
//! closure `F: FnOnce(CancellationToken) -> Fut` is erased into a [`Job`]:
//! a one-shot factory producing a boxed future.
//!
//! The typed result never crosses the lane. On success the job returns a
//! [`Delivery`] thunk; the driver first records the terminal transition and
//! only then invokes the thunk, so a caller that observes the result also
//! observes the final status. Failures are routed through [`Settle`], which
//! the lane can also use for tasks that never start (cancelled while queued).

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Sends a successful result to the submitter when invoked.
pub(crate) type Delivery = Box<dyn FnOnce() + Send>;

/// Future of one erased action.
pub(crate) type JobFuture = BoxFuture<'static, Result<Delivery, TaskError>>;

/// One-shot erased action.
pub(crate) type Job = Box<dyn FnOnce(CancellationToken) -> JobFuture + Send>;

/// Receiving half handed to the submitter.
pub(crate) type Outcome<T> = oneshot::Receiver<Result<T, TaskError>>;

/// Delivers a terminal failure to the submitter.
pub(crate) trait Settle: Send + Sync {
    fn fail(&self, err: TaskError);
}

struct Completion<T> {
    tx: Mutex<Option<oneshot::Sender<Result<T, TaskError>>>>,
}

impl<T: Send> Completion<T> {
    /// First writer wins; later sends are dropped.
    fn send(&self, res: Result<T, TaskError>) {
        if let Some(tx) = self.tx.lock().take() {
            let _ = tx.send(res);
        }
    }
}

impl<T: Send> Settle for Completion<T> {
    fn fail(&self, err: TaskError) {
        self.send(Err(err));
    }
}

/// Erases `action` into a [`Job`], returning the failure channel and the
/// receiver for the eventual result.
pub(crate) fn erase<T, F, Fut>(action: F) -> (Job, Arc<dyn Settle>, Outcome<T>)
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let completion = Arc::new(Completion {
        tx: Mutex::new(Some(tx)),
    });
    let settle: Arc<dyn Settle> = completion.clone();

    let job: Job = Box::new(move |token| {
        let fut = action(token);
        Box::pin(async move {
            let value = fut.await?;
            let deliver: Delivery = Box::new(move || completion.send(Ok(value)));
            Ok(deliver)
        })
    });
    (job, settle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_is_sent_only_on_delivery() {
        let (job, _settle, mut rx) = erase(|_tok| async { Ok::<_, TaskError>(7u32) });

        let deliver = match job(CancellationToken::new()).await {
            Ok(d) => d,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert!(rx.try_recv().is_err(), "value must wait for delivery");

        deliver();
        assert_eq!(rx.await.ok(), Some(Ok(7)));
    }

    #[tokio::test]
    async fn test_first_settlement_wins() {
        let (_job, settle, rx) = erase(|_tok| async { Ok::<_, TaskError>(()) });
        settle.fail(TaskError::Cancelled);
        settle.fail(TaskError::execution("late"));
        assert_eq!(rx.await.ok(), Some(Err(TaskError::Cancelled)));
    }

    #[tokio::test]
    async fn test_action_error_passes_through() {
        let (job, _settle, _rx) =
            erase(|_tok| async { Err::<(), _>(TaskError::execution("exit 1")) });
        let res = job(CancellationToken::new()).await;
        assert!(matches!(res, Err(TaskError::Execution { .. })));
    }
}
