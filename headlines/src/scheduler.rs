use anyhow::ensure;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::aggregator::Aggregator;
use crate::cache::NewsCache;

/// Counters describing what the refresh loop has done so far.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    cycles_started: AtomicU64,
    cycles_completed: AtomicU64,
    ticks_skipped: AtomicU64,
}

impl SchedulerStats {
    pub fn cycles_started(&self) -> u64 {
        self.cycles_started.load(Ordering::SeqCst)
    }

    /// Cycles whose snapshot reached the cache.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::SeqCst)
    }

    /// Ticks dropped because the previous cycle was still running.
    pub fn ticks_skipped(&self) -> u64 {
        self.ticks_skipped.load(Ordering::SeqCst)
    }
}

/// Drives `Aggregator::run_cycle` on a fixed period and publishes each
/// finished snapshot into the cache. At most one cycle is in flight.
pub struct Scheduler {
    aggregator: Arc<Aggregator>,
    cache: Arc<NewsCache>,
    interval: Duration,
    stats: Arc<SchedulerStats>,
}

impl Scheduler {
    pub fn new(
        aggregator: Arc<Aggregator>,
        cache: Arc<NewsCache>,
        interval: Duration,
    ) -> anyhow::Result<Self> {
        ensure!(!interval.is_zero(), "refresh interval must be greater than zero");
        Ok(Self {
            aggregator,
            cache,
            interval,
            stats: Arc::new(SchedulerStats::default()),
        })
    }

    pub fn stats(&self) -> Arc<SchedulerStats> {
        self.stats.clone()
    }

    /// Run the refresh loop on its own task until `shutdown` flips to `true`
    /// (or its sender is dropped).
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "scheduler: starting");

        // First tick completes immediately, so the cache fills at startup.
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: Option<JoinHandle<()>> = None;

        if !*shutdown.borrow() {
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if in_flight.as_ref().is_some_and(|h| !h.is_finished()) {
                            self.stats.ticks_skipped.fetch_add(1, Ordering::SeqCst);
                            info!("scheduler: previous cycle still running, skipping tick");
                            continue;
                        }
                        in_flight = Some(self.start_cycle());
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("scheduler: shutdown requested, exiting loop");
                            break;
                        }
                    }
                }
            }
        }

        if let Some(handle) = in_flight.take() {
            if !handle.is_finished() {
                info!("scheduler: abandoning in-flight cycle");
                handle.abort();
            }
            // Either the cycle published in full or it never will.
            let _ = handle.await;
        }
        info!("scheduler: stopped");
    }

    fn start_cycle(&self) -> JoinHandle<()> {
        let aggregator = self.aggregator.clone();
        let cache = self.cache.clone();
        let stats = self.stats.clone();
        tokio::spawn(async move {
            let n = stats.cycles_started.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(cycle = n, "scheduler: cycle started");
            let snapshot = aggregator.run_cycle().await;
            let items = snapshot.len();
            cache.publish(snapshot);
            stats.cycles_completed.fetch_add(1, Ordering::SeqCst);
            info!(cycle = n, items, "scheduler: snapshot published");
        })
    }
}
