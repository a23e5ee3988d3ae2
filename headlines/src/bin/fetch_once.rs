// Runs a single refresh cycle against the configured feeds and prints the
// snapshot as JSON. Handy for checking feeds and the summarizer by hand.

use anyhow::Context;
use clap::Parser;
use common::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use headlines::ingestion::HttpFeedSource;
use headlines::{enrich, Aggregator, CycleLimits};

#[derive(Parser, Debug)]
#[command(name = "fetch_once", about = "Run one aggregation cycle and print the snapshot")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only print the cycle report
    #[arg(long)]
    report_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_for_cli(Path::new("."), args.config.as_deref())
        .await
        .context("failed to load configuration")?;

    let aggregator = Aggregator::new(
        config.sources.urls.clone(),
        Arc::new(HttpFeedSource::new(&config.fetch)?),
        enrich::from_config(&config.enrichment)?,
        CycleLimits::from_config(&config),
    );

    let snapshot = aggregator.run_cycle().await;
    let out = if args.report_only {
        serde_json::to_string_pretty(&snapshot.report)
    } else {
        serde_json::to_string_pretty(&snapshot)
    }
    .context("failed to serialize snapshot")?;
    println!("{}", out);
    Ok(())
}
