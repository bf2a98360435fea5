//! # Example: lanes
//!
//! Walks through the main lane behaviors with the built-in [`LogWriter`]
//! printing every event.
//!
//! Demonstrates how to:
//! - Load a [`RegistryConfig`] with per-lane presets.
//! - Serialize one session's turns in a session lane.
//! - Cap concurrent work in a bounded-parallel lane.
//! - Reject work past a lane's queue depth.
//! - Cancel a queued task and time out a running one.
//!
//! ## Flow
//! ```text
//! Registry::new(cfg) ──► subscribe(LogWriter)
//!     ├─► session:chat-1   3 turns, strictly in order
//!     ├─► build            6 jobs, at most 2 at once
//!     ├─► tools            depth 1, reject → QueueFull
//!     └─► sandbox          queued cancel, 100ms deadline
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example lanes --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use lanevisor::{
    BackpressurePolicy, LaneConfig, LaneKey, LogWriter, Registry, RegistryConfig, TaskError,
    TaskOptions,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 1. Registry with presets for the named lanes used below.
    let cfg = RegistryConfig::default()
        .with_lane("build", LaneConfig::bounded(2))
        .with_lane("tools", LaneConfig::serial(1, BackpressurePolicy::Reject))
        .with_lane(
            "sandbox",
            LaneConfig::default().with_default_timeout(Duration::from_millis(100)),
        );
    let registry = Registry::new(cfg)?;
    registry.subscribe(Arc::new(LogWriter::new()));

    // 2. Session lane: turns of one conversation never overlap.
    let session = LaneKey::session("chat-1");
    let mut turns = Vec::new();
    for turn in 1..=3 {
        turns.push(
            registry
                .submit(session.clone(), TaskOptions::new(), move |_t| async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, TaskError>(format!("reply #{turn}"))
                })
                .await?,
        );
    }
    for h in turns {
        println!("[demo] {}", h.join().await?);
    }

    // 3. Bounded lane: six builds, two at a time.
    let build = registry.laned("build", TaskOptions::new(), |n: u32, _t| async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok::<_, TaskError>(n)
    });
    let builds = futures::future::join_all((0..6).map(|n| {
        let build = build.clone();
        async move { build.call(n).await }
    }))
    .await;
    println!("[demo] builds finished: {}", builds.iter().filter(|r| r.is_ok()).count());

    // 4. Reject policy: one running, one queued, the third is refused.
    let busy = |_t| async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, TaskError>(())
    };
    let a = registry.submit("tools", TaskOptions::new(), busy).await?;
    let b = registry.submit("tools", TaskOptions::new(), busy).await?;
    match registry.submit("tools", TaskOptions::new(), busy).await {
        Err(e) => println!("[demo] rejected: {} ({})", e.as_message(), e.as_label()),
        Ok(_) => println!("[demo] unexpectedly admitted"),
    }
    a.join().await?;
    b.join().await?;

    // 5. Cancellation and deadline in a serial lane with a 100ms default timeout.
    let stuck = registry
        .submit("sandbox", TaskOptions::new(), |token| async move {
            token.cancelled().await;
            Err::<(), _>(TaskError::Cancelled)
        })
        .await?;
    let waiting = registry
        .submit("sandbox", TaskOptions::new(), |_t| async { Ok::<_, TaskError>(()) })
        .await?;
    registry.cancel(waiting.id())?;
    println!("[demo] queued task: {}", waiting.status());
    if let Err(e) = stuck.join().await {
        println!("[demo] stuck task: {e}");
    }

    for stats in registry.all_stats() {
        println!(
            "[demo] {:<16} submitted={} succeeded={} cancelled={} timed_out={} rejected={}",
            stats.lane,
            stats.submitted,
            stats.succeeded,
            stats.cancelled,
            stats.timed_out,
            stats.rejected
        );
    }

    // Give the log subscriber a moment to drain.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
