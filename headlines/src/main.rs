/*
headlines - single-binary main.rs
This binary starts the Rocket HTTP server and runs the refresh scheduler inside the same process.
*/

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use common::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use headlines::ingestion::HttpFeedSource;
use headlines::server::{self, AppState};
use headlines::{enrich, Aggregator, CycleLimits, NewsCache, Scheduler};

#[derive(Parser, Debug)]
#[command(name = "headlines", about = "headlines news cache: HTTP server + refresh scheduler")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run the refresh scheduler only (do not bind HTTP server)
    #[arg(long)]
    no_server: bool,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Some(p) = args.config.as_deref().filter(|p| !p.exists()) {
        error!(path = ?p, "specified config file not found");
    }
    let config = Config::load_for_cli(Path::new("."), args.config.as_deref())
        .await
        .context("failed to load configuration")?;
    info!(
        config = ?args.config,
        sources = config.sources.urls.len(),
        "configuration loaded"
    );

    let feed_source = Arc::new(HttpFeedSource::new(&config.fetch)?);
    let enricher = enrich::from_config(&config.enrichment)?;
    let aggregator = Arc::new(Aggregator::new(
        config.sources.urls.clone(),
        feed_source,
        enricher,
        CycleLimits::from_config(&config),
    ));
    let cache = Arc::new(NewsCache::new());

    let scheduler = Scheduler::new(aggregator, cache.clone(), config.scheduler.interval())?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    info!("Spawning refresh scheduler");
    let scheduler_handle = scheduler.spawn(shutdown_rx);

    if args.no_server {
        info!("HTTP server disabled via CLI (--no-server); press Ctrl-C to stop");
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(%e, "failed to listen for ctrl-c");
        }
    } else {
        let state = AppState {
            started_at: Utc::now(),
            cache,
            source_count: config.sources.urls.len(),
            interval_seconds: config.scheduler.interval_seconds,
        };
        if let Err(e) = server::launch_rocket(state, &config.server).await {
            error!(%e, "Rocket server failed");
        }
    }

    info!("notifying scheduler to shutdown");
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(Duration::from_secs(20), scheduler_handle).await {
        Ok(Ok(())) => info!("scheduler exited cleanly"),
        Ok(Err(join_err)) => error!(%join_err, "scheduler task panicked"),
        Err(_) => info!("Timed out waiting for scheduler to exit; continuing shutdown"),
    }

    info!("Shutdown complete");
    Ok(())
}
