use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary used when an item has no content or its enrichment failed.
pub const PLACEHOLDER_SUMMARY: &str = "No content available";

/// One entry as handed over by a feed source, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// First media reference declared by the entry
    pub media_url: Option<String>,
    /// Publish time as text (RFC 3339 or RFC 2822)
    pub published: Option<String>,
    pub body: String,
}

/// Canonical article as served to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub link: String,
    pub cover_image: Option<String>,
    pub published: DateTime<Utc>,
    pub content: String,
    pub summary: String,
}

impl NewsItem {
    /// Copy of this item carrying `summary`.
    pub fn with_summary(self, summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..self
        }
    }
}

/// Health counters of one aggregation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub sources_total: usize,
    pub sources_failed: Vec<String>,
    pub entries_dropped: usize,
    pub enrichment_failures: usize,
    pub items: usize,
}

impl CycleReport {
    pub fn sources_ok(&self) -> usize {
        self.sources_total.saturating_sub(self.sources_failed.len())
    }

    pub fn elapsed_ms(&self) -> i64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => (end - start).num_milliseconds(),
            _ => 0,
        }
    }
}

/// Complete result of one cycle; the unit of publication to the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<NewsItem>,
    /// `None` until the first cycle has been published
    pub report: Option<CycleReport>,
}

impl Snapshot {
    pub fn new(items: Vec<NewsItem>, report: CycleReport) -> Self {
        Self {
            items,
            report: Some(report),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
