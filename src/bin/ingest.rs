//! Feed ingestion entrypoint. Pulls the upstream quip feed and upserts
//! it into the videos table, then exits.

use anyhow::Context;
use dotenv::dotenv;
use quipvid_server::{ingest, AppState, Settings};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .pretty()
        .init();

    let config = Settings::new().context("failed to load configuration")?;
    info!("Ingesting from {}", config.ingest.api_url);

    let state = AppState::new(config.clone())
        .await
        .context("failed to connect to database")?;

    let summary = ingest::run(&state.db, &config.ingest)
        .await
        .context("ingestion failed")?;

    info!(
        "All video records have been processed ({} of {} upserted)",
        summary.processed, summary.fetched
    );

    state.shutdown().await.ok();
    Ok(())
}
