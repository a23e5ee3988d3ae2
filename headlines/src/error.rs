//! Failure taxonomy of a refresh cycle. None of these is fatal: each one
//! removes a source, an entry, or a summary from the current cycle only.

use std::time::Duration;

/// A source could not be fetched or its document could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{source_url}: request failed: {error}")]
    Http {
        source_url: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("{source_url}: feed fetch failed with status {status}")]
    Status { source_url: String, status: u16 },

    #[error("{source_url}: feed body exceeds {limit} bytes")]
    TooLarge { source_url: String, limit: u64 },

    #[error("{source_url}: failed to parse feed: {reason}")]
    Parse { source_url: String, reason: String },

    #[error("{source_url}: fetch timed out after {after:?}")]
    Timeout { source_url: String, after: Duration },
}

impl FetchError {
    /// Identifier of the source this failure belongs to.
    pub fn source_url(&self) -> &str {
        match self {
            FetchError::Http { source_url, .. }
            | FetchError::Status { source_url, .. }
            | FetchError::TooLarge { source_url, .. }
            | FetchError::Parse { source_url, .. }
            | FetchError::Timeout { source_url, .. } => source_url,
        }
    }
}

/// A single entry lacks a field every `NewsItem` needs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEntryError {
    #[error("entry has no title")]
    MissingTitle,
    #[error("entry {title:?} has no link")]
    MissingLink { title: String },
}

/// The summarization backend failed for one item.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("summarizer unavailable: {0}")]
    Unavailable(String),

    #[error("summarizer request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("summarizer returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("summarizer returned no usable text")]
    Empty,

    #[error("summarizer timed out after {0:?}")]
    Timeout(Duration),
}
