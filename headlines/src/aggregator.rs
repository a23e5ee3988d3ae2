use chrono::Utc;
use common::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::enrich::{enrich, EnrichOutcome, Enricher};
use crate::error::FetchError;
use crate::ingestion::FeedSource;
use crate::model::{CycleReport, NewsItem, Snapshot};
use crate::normalize::normalize;

/// Limits applied to one refresh cycle.
#[derive(Debug, Clone)]
pub struct CycleLimits {
    pub fetch_timeout: Duration,
    pub fetch_concurrency: usize,
    pub enrich_timeout: Duration,
    pub enrich_concurrency: usize,
}

impl CycleLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fetch_timeout: config.fetch.timeout(),
            fetch_concurrency: config.fetch.max_concurrency,
            enrich_timeout: config.enrichment.timeout(),
            enrich_concurrency: config.enrichment.max_concurrency,
        }
    }
}

impl Default for CycleLimits {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(15),
            fetch_concurrency: 8,
            enrich_timeout: Duration::from_secs(60),
            enrich_concurrency: 4,
        }
    }
}

/// Runs refresh cycles over a fixed, ordered list of sources.
pub struct Aggregator {
    sources: Vec<String>,
    shared: Arc<Shared>,
}

struct Shared {
    feed_source: Arc<dyn FeedSource>,
    enricher: Arc<dyn Enricher>,
    limits: CycleLimits,
}

/// What one source contributed to a cycle.
struct SourceYield {
    items: Vec<NewsItem>,
    dropped: usize,
    enriched_ok: usize,
}

impl Aggregator {
    pub fn new(
        sources: Vec<String>,
        feed_source: Arc<dyn FeedSource>,
        enricher: Arc<dyn Enricher>,
        limits: CycleLimits,
    ) -> Self {
        Self {
            sources,
            shared: Arc::new(Shared {
                feed_source,
                enricher,
                limits,
            }),
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Fetch, normalize and enrich every source, and assemble the snapshot.
    ///
    /// Sources run as separate tasks; their results land in slots indexed by
    /// source position, so the snapshot keeps source-then-entry order no matter
    /// which task finishes first. Dropping the returned future aborts every
    /// outstanding fetch and enrichment task.
    pub async fn run_cycle(&self) -> Snapshot {
        let started_at = Utc::now();
        let fetch_permits = Arc::new(Semaphore::new(self.shared.limits.fetch_concurrency.max(1)));
        let enrich_permits = Arc::new(Semaphore::new(self.shared.limits.enrich_concurrency.max(1)));

        let mut tasks = JoinSet::new();
        for (idx, url) in self.sources.iter().enumerate() {
            let shared = self.shared.clone();
            let url = url.clone();
            let fetch_permits = fetch_permits.clone();
            let enrich_permits = enrich_permits.clone();
            tasks.spawn(async move {
                let res = collect_source(shared, &url, fetch_permits, enrich_permits).await;
                (idx, res)
            });
        }

        let mut slots: Vec<Option<Result<SourceYield, FetchError>>> =
            self.sources.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, res)) => slots[idx] = Some(res),
                Err(e) => error!(error = %e, "source task aborted"),
            }
        }

        let mut report = CycleReport {
            started_at: Some(started_at),
            sources_total: self.sources.len(),
            ..CycleReport::default()
        };
        let mut items = Vec::new();
        for (url, slot) in self.sources.iter().zip(slots) {
            match slot {
                Some(Ok(found)) => {
                    report.entries_dropped += found.dropped;
                    report.enrichment_failures += found.items.len() - found.enriched_ok;
                    items.extend(found.items);
                }
                Some(Err(e)) => {
                    warn!(source = %url, error = %e, "source skipped this cycle");
                    report.sources_failed.push(url.clone());
                }
                None => report.sources_failed.push(url.clone()),
            }
        }
        report.items = items.len();
        report.finished_at = Some(Utc::now());

        info!(
            items = report.items,
            sources_ok = report.sources_ok(),
            sources_failed = report.sources_failed.len(),
            entries_dropped = report.entries_dropped,
            enrichment_failures = report.enrichment_failures,
            elapsed_ms = report.elapsed_ms(),
            "cycle complete"
        );
        Snapshot::new(items, report)
    }
}

async fn collect_source(
    shared: Arc<Shared>,
    url: &str,
    fetch_permits: Arc<Semaphore>,
    enrich_permits: Arc<Semaphore>,
) -> Result<SourceYield, FetchError> {
    let entries = {
        let _permit = fetch_permits.acquire().await.ok();
        let timeout = shared.limits.fetch_timeout;
        match tokio::time::timeout(timeout, shared.feed_source.fetch(url)).await {
            Ok(res) => res?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    source_url: url.to_string(),
                    after: timeout,
                })
            }
        }
    };
    debug!(source = url, entries = entries.len(), "source fetched");

    let total = entries.len();
    let mut normalized = Vec::with_capacity(total);
    for raw in entries {
        match normalize(raw, Utc::now()) {
            Ok(item) => normalized.push(item),
            Err(e) => debug!(source = url, error = %e, "dropping malformed entry"),
        }
    }
    let dropped = total - normalized.len();

    // Each slot starts as the placeholder-summary item, so an aborted
    // enrichment task still leaves the item in place.
    let mut slots = normalized.clone();
    let mut tasks = JoinSet::new();
    for (idx, item) in normalized.into_iter().enumerate() {
        let shared = shared.clone();
        let enrich_permits = enrich_permits.clone();
        tasks.spawn(async move {
            let _permit = enrich_permits.acquire_owned().await.ok();
            let (item, outcome) =
                enrich(shared.enricher.as_ref(), item, shared.limits.enrich_timeout).await;
            (idx, item, outcome)
        });
    }

    let mut enriched_ok = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, item, outcome)) => {
                if outcome != EnrichOutcome::Failed {
                    enriched_ok += 1;
                }
                slots[idx] = item;
            }
            Err(e) => error!(source = url, error = %e, "enrichment task aborted"),
        }
    }

    Ok(SourceYield {
        items: slots,
        dropped,
        enriched_ok,
    })
}
