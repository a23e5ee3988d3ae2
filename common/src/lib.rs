/*!
common/src/lib.rs

Shared configuration types for headlines.

This file provides:
- Config data structures (deserialized from TOML, every section defaulted)
- An async loader that merges a default file with an optional override file
- Validation of the merged configuration
*/

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Feeds aggregated when no `[sources]` section is configured.
pub const DEFAULT_FEEDS: &[&str] = &[
    "https://www.theguardian.com/international/rss",
    "https://www.dailymail.co.uk/news/index.rss",
    "https://www.independent.co.uk/news/world/rss",
    "https://feeds.bbci.co.uk/news/world/rss.xml",
];

/// Ordered list of feed URLs, fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub urls: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            urls: DEFAULT_FEEDS.iter().map(|u| u.to_string()).collect(),
        }
    }
}

/// Refresh loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between two refresh ticks
    pub interval_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
        }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Feed fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    /// Upper bound on sources fetched at the same time
    pub max_concurrency: usize,
    pub max_response_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
            max_concurrency: 8,
            max_response_bytes: 10 * 1024 * 1024,
            user_agent: concat!("headlines/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Remote summarization endpoint (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<usize>,
}

/// Enrichment stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub adapter: String, // "remote", "extractive", "none"
    pub timeout_seconds: u64,
    /// Upper bound on summarization calls in flight across all sources
    pub max_concurrency: usize,
    /// Length cap for the extractive summarizer
    pub max_chars: usize,
    pub remote: Option<RemoteLlmConfig>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            adapter: "extractive".to_string(),
            timeout_seconds: 60,
            max_concurrency: 4,
            max_chars: 280,
            remote: None,
        }
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// HTTP server binding and CORS
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a single TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        Self::from_toml_str(&data)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(data).context("Failed to parse TOML configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load the configuration the binaries run with: `config.default.toml`
    /// from `dir`, overridden by `explicit` when given, else by `config.toml`
    /// from `dir` when it exists. A missing `explicit` file is an error.
    pub async fn load_for_cli(dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let default_path = dir.join("config.default.toml");
        let override_path = match explicit {
            Some(p) if !p.exists() => bail!("Config file not found: {}", p.display()),
            Some(p) => Some(p.to_path_buf()),
            None => Some(dir.join("config.toml")).filter(|p| p.exists()),
        };
        Self::load_with_defaults(Some(&default_path), override_path.as_deref()).await
    }

    /// Reject configurations the refresh loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sources.urls.is_empty() {
            bail!("sources.urls must list at least one feed");
        }
        for u in &self.sources.urls {
            url::Url::parse(u).with_context(|| format!("invalid source URL: {}", u))?;
        }
        if self.scheduler.interval_seconds == 0 {
            bail!("scheduler.interval_seconds must be greater than zero");
        }
        if self.fetch.max_concurrency == 0 || self.enrichment.max_concurrency == 0 {
            bail!("fetch.max_concurrency and enrichment.max_concurrency must be greater than zero");
        }
        match self.enrichment.adapter.as_str() {
            "remote" | "extractive" | "none" => Ok(()),
            other => bail!("unknown enrichment adapter: {}", other),
        }
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}
