#![allow(dead_code)]

use async_trait::async_trait;
use headlines::enrich::Enricher;
use headlines::error::{EnrichmentError, FetchError};
use headlines::ingestion::FeedSource;
use headlines::RawEntry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn entry(title: &str, body: &str) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        link: Some(format!("https://news.example/{}", title.replace(' ', "-"))),
        media_url: None,
        published: Some("2025-06-10T08:30:00Z".to_string()),
        body: body.to_string(),
    }
}

/// Tracks how many calls are running at once.
#[derive(Default)]
pub struct Gauge {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl Gauge {
    pub fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

pub enum StubFeed {
    Entries {
        entries: Vec<RawEntry>,
        delay: Duration,
    },
    Fail,
    Hang,
}

/// In-memory feed source keyed by URL.
#[derive(Default)]
pub struct StubSource {
    feeds: HashMap<String, StubFeed>,
    pub calls: AtomicUsize,
    pub gauge: Gauge,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, feed: StubFeed) -> Self {
        self.feeds.insert(url.to_string(), feed);
        self
    }

    pub fn entries(self, url: &str, entries: Vec<RawEntry>) -> Self {
        self.with(
            url,
            StubFeed::Entries {
                entries,
                delay: Duration::ZERO,
            },
        )
    }

    pub fn delayed(self, url: &str, entries: Vec<RawEntry>, delay: Duration) -> Self {
        self.with(url, StubFeed::Entries { entries, delay })
    }
}

#[async_trait]
impl FeedSource for StubSource {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gauge.enter();
        let res = match self.feeds.get(url) {
            Some(StubFeed::Entries { entries, delay }) => {
                tokio::time::sleep(*delay).await;
                Ok(entries.clone())
            }
            Some(StubFeed::Hang) => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Ok(Vec::new())
            }
            Some(StubFeed::Fail) | None => Err(FetchError::Status {
                source_url: url.to_string(),
                status: 503,
            }),
        };
        self.gauge.exit();
        res
    }
}

/// Feed source whose n-th call (1-based) yields entries titled `cycle{n}-{i}`
/// after `delay(n)`.
pub struct SequenceSource {
    pub calls: AtomicUsize,
    pub gauge: Gauge,
    per_call: usize,
    delay: fn(usize) -> Duration,
}

impl SequenceSource {
    pub fn new(per_call: usize, delay: fn(usize) -> Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gauge: Gauge::default(),
            per_call,
            delay,
        }
    }
}

#[async_trait]
impl FeedSource for SequenceSource {
    async fn fetch(&self, _url: &str) -> Result<Vec<RawEntry>, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.enter();
        tokio::time::sleep((self.delay)(n)).await;
        self.gauge.exit();
        Ok((0..self.per_call)
            .map(|i| entry(&format!("cycle{n}-{i}"), "body"))
            .collect())
    }
}

/// Prefixes the content; fails on content containing "FAIL".
#[derive(Default)]
pub struct TagEnricher {
    pub calls: AtomicUsize,
    pub gauge: Gauge,
    pub delay: Duration,
}

impl TagEnricher {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Enricher for TagEnricher {
    async fn summarize(&self, content: &str) -> Result<String, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gauge.enter();
        tokio::time::sleep(self.delay).await;
        self.gauge.exit();
        if content.contains("FAIL") {
            return Err(EnrichmentError::Unavailable("model offline".to_string()));
        }
        Ok(format!("summary: {content}"))
    }
}
