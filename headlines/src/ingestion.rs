use async_trait::async_trait;
use common::FetchConfig;
use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use crate::error::FetchError;
use crate::model::RawEntry;

/// Fetches one remote feed and hands back its entries in document order.
///
/// Implementations do not retry; a failed source is simply retried on the
/// next refresh tick.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError>;
}

/// HTTP feed client: reqwest for transport, feed-rs for RSS/Atom/JSON Feed.
pub struct HttpFeedSource {
    client: Client,
    max_response_bytes: u64,
}

impl HttpFeedSource {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build reqwest client: {}", e))?;
        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError> {
        let http_err = |error| FetchError::Http {
            source_url: url.to_string(),
            error,
        };

        let mut response = self.client.get(url).send().await.map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                source_url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let too_large = || FetchError::TooLarge {
            source_url: url.to_string(),
            limit: self.max_response_bytes,
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_response_bytes)
        {
            return Err(too_large());
        }

        // Chunked bodies carry no length, so the cap is enforced while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(http_err)? {
            if (body.len() + chunk.len()) as u64 > self.max_response_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        let entries = parse_feed(url, &body)?;
        debug!(source = url, entries = entries.len(), "feed parsed");
        Ok(entries)
    }
}

/// Parse a feed document into raw entries.
pub fn parse_feed(url: &str, body: &[u8]) -> Result<Vec<RawEntry>, FetchError> {
    let feed = parser::parse(body).map_err(|e| FetchError::Parse {
        source_url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(feed.entries.into_iter().map(raw_entry).collect())
}

fn raw_entry(entry: Entry) -> RawEntry {
    let media_url = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
        .or_else(|| {
            entry
                .media
                .iter()
                .flat_map(|m| m.thumbnails.iter())
                .map(|t| t.image.uri.clone())
                .next()
        });

    let body = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    RawEntry {
        title: entry.title.map(|t| t.content),
        link: entry.links.into_iter().next().map(|l| l.href),
        media_url,
        published: entry.published.or(entry.updated).map(|d| d.to_rfc3339()),
        body,
    }
}
