use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use common::EnrichmentConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::EnrichmentError;
use crate::model::{NewsItem, PLACEHOLDER_SUMMARY};

pub mod extractive;
pub mod remote;

/// Summarization backend. Given an item's non-empty content, produce a
/// short summary. The returned text is used verbatim.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn summarize(&self, content: &str) -> Result<String, EnrichmentError>;
}

/// Backend for `adapter = "none"`: every call fails, so every item keeps the
/// placeholder summary.
pub struct DisabledEnricher;

#[async_trait]
impl Enricher for DisabledEnricher {
    async fn summarize(&self, _content: &str) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::Unavailable("enrichment disabled".to_string()))
    }
}

/// Build the backend selected by `enrichment.adapter`.
pub fn from_config(config: &EnrichmentConfig) -> anyhow::Result<Arc<dyn Enricher>> {
    match config.adapter.as_str() {
        "extractive" => Ok(Arc::new(extractive::ExtractiveEnricher::new(config.max_chars))),
        "none" => {
            info!("enrichment disabled, every item gets the placeholder summary");
            Ok(Arc::new(DisabledEnricher))
        }
        "remote" => {
            let remote = config
                .remote
                .as_ref()
                .ok_or_else(|| anyhow!("enrichment.adapter = \"remote\" needs an [enrichment.remote] section"))?;
            let api_url = remote
                .api_url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434/v1/chat/completions".to_string());
            // Local OpenAI-compatible servers accept any key
            let api_key = match remote.api_key_env.as_deref() {
                Some(var) => std::env::var(var)
                    .with_context(|| format!("LLM API key env var '{}' not set", var))?,
                None => String::new(),
            };
            let model = remote.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string());
            info!(api_url = %api_url, model = %model, "remote summarizer configured");
            Ok(Arc::new(
                remote::RemoteEnricher::new(api_url, api_key, model)
                    .with_max_tokens(remote.max_tokens.unwrap_or(200)),
            ))
        }
        other => bail!("Unknown enrichment adapter: {}", other),
    }
}

/// What the enrichment stage did with one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// Content was empty; the backend was not called.
    Skipped,
    Summarized,
    /// The backend failed or timed out; the placeholder was used.
    Failed,
}

/// Run the enrichment stage for one item.
pub async fn enrich<E: Enricher + ?Sized>(
    enricher: &E,
    item: NewsItem,
    timeout: Duration,
) -> (NewsItem, EnrichOutcome) {
    if item.content.is_empty() {
        return (item.with_summary(PLACEHOLDER_SUMMARY), EnrichOutcome::Skipped);
    }

    let result = match tokio::time::timeout(timeout, enricher.summarize(&item.content)).await {
        Ok(r) => r,
        Err(_) => Err(EnrichmentError::Timeout(timeout)),
    };

    match result {
        Ok(summary) => {
            debug!(link = %item.link, chars = summary.len(), "item summarized");
            (item.with_summary(summary), EnrichOutcome::Summarized)
        }
        Err(e) => {
            warn!(link = %item.link, error = %e, "summarization failed, using placeholder");
            (item.with_summary(PLACEHOLDER_SUMMARY), EnrichOutcome::Failed)
        }
    }
}
