//! Event channel: transition order, subscriber isolation, unsubscribe.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lanevisor::{Event, EventKind, Registry, Subscribe, TaskError, TaskId, TaskOptions, TaskStatus};
use parking_lot::Mutex;
use tokio::sync::broadcast;

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(EventKind, Option<TaskId>)>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.seen.lock().push((ev.kind, ev.task));
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

impl Recorder {
    fn kinds(&self) -> Vec<EventKind> {
        self.seen.lock().iter().map(|(k, _)| *k).collect()
    }

    async fn wait_for(&self, n: usize) {
        for _ in 0..200 {
            if self.seen.lock().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("recorder saw {:?}, expected {n} events", self.kinds());
    }
}

struct Panicker;

#[async_trait]
impl Subscribe for Panicker {
    async fn on_event(&self, _ev: &Event) {
        panic!("subscriber bug");
    }

    fn name(&self) -> &'static str {
        "panicker"
    }
}

async fn next_of(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == kind => return ev,
                Ok(_) => continue,
                Err(e) => panic!("receiver failed: {e}"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no {kind:?} event"))
}

#[tokio::test]
async fn raw_events_follow_transition_order() {
    let reg = Registry::with_defaults();
    let mut rx = reg.events();

    let err = reg
        .with_lane("e", TaskOptions::new(), |_t| async {
            Err::<(), _>(TaskError::execution("bad input"))
        })
        .await
        .unwrap_err();
    assert_eq!(err.as_label(), "task_execution");

    let created = rx.recv().await.unwrap();
    assert_eq!(created.kind, EventKind::LaneCreated);
    assert_eq!(created.lane.as_deref(), Some("e"));

    let queued = rx.recv().await.unwrap();
    let started = rx.recv().await.unwrap();
    let failed = rx.recv().await.unwrap();

    assert_eq!(queued.status(), Some(TaskStatus::Queued));
    assert_eq!(started.status(), Some(TaskStatus::Running));
    assert_eq!(failed.status(), Some(TaskStatus::Failed));
    assert_eq!(queued.task, failed.task);
    assert!(queued.seq < started.seq && started.seq < failed.seq);
    assert_eq!(
        failed.error.as_deref(),
        Some("execution failed: bad input")
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_event_carries_the_deadline() {
    let reg = Registry::with_defaults();
    let mut rx = reg.events();

    let out = reg
        .with_lane("slow", TaskOptions::new().with_timeout_ms(50), |token| async move {
            token.cancelled().await;
            Err::<(), _>(TaskError::Cancelled)
        })
        .await;
    assert!(matches!(out, Err(lanevisor::Error::Task(TaskError::Timeout { .. }))));

    let started = next_of(&mut rx, EventKind::TaskStarted).await;
    assert_eq!(started.timeout_ms, Some(50));
    let timed_out = next_of(&mut rx, EventKind::TaskTimedOut).await;
    assert_eq!(timed_out.timeout_ms, Some(50));
    assert_eq!(timed_out.task, started.task);
}

#[tokio::test]
async fn subscriber_sees_every_transition() {
    let reg = Registry::with_defaults();
    let rec = Arc::new(Recorder::default());
    reg.subscribe(rec.clone());

    let h = reg
        .submit("s", TaskOptions::new(), |_t| async { Ok::<_, TaskError>(()) })
        .await
        .unwrap();
    let id = h.id();
    h.join().await.unwrap();

    rec.wait_for(4).await;
    assert_eq!(
        rec.kinds(),
        vec![
            EventKind::LaneCreated,
            EventKind::TaskQueued,
            EventKind::TaskStarted,
            EventKind::TaskSucceeded,
        ]
    );
    assert!(rec.seen.lock()[1..].iter().all(|(_, t)| *t == Some(id)));
}

#[tokio::test]
async fn panicking_subscriber_is_isolated() {
    let reg = Registry::with_defaults();
    let mut rx = reg.events();
    let rec = Arc::new(Recorder::default());
    reg.subscribe(Arc::new(Panicker));
    reg.subscribe(rec.clone());

    let out = reg
        .with_lane("iso", TaskOptions::new(), |_t| async { Ok::<_, TaskError>(5) })
        .await
        .unwrap();
    assert_eq!(out, 5);

    let panicked = next_of(&mut rx, EventKind::SubscriberPanicked).await;
    assert_eq!(panicked.subscriber, Some("panicker"));
    assert!(panicked.lane.is_none());
    assert!(
        panicked.error.as_deref().unwrap_or("").contains("subscriber bug"),
        "{panicked:?}"
    );

    rec.wait_for(4).await;
    assert_eq!(reg.stats("iso").unwrap().succeeded, 1);
}

#[tokio::test]
async fn unsubscribe_is_idempotent_and_stops_delivery() {
    let reg = Registry::with_defaults();
    let rec = Arc::new(Recorder::default());

    let sub = reg.subscribe(rec.clone());
    let again = reg.subscribe(rec.clone());
    assert_eq!(sub.id(), again.id());

    reg.with_lane("u", TaskOptions::new(), |_t| async { Ok::<_, TaskError>(()) })
        .await
        .unwrap();
    rec.wait_for(4).await;

    assert!(sub.unsubscribe());
    assert!(!sub.unsubscribe());
    assert!(!again.unsubscribe());

    reg.with_lane("u", TaskOptions::new(), |_t| async { Ok::<_, TaskError>(()) })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(rec.seen.lock().len(), 4);
}
