//! npsfind - Browse national park sites by state and find places nearby
//!
//! Prompts for a state, lists the national sites in it, and shows points of
//! interest around a chosen site. Every page and API response is cached on
//! disk so reruns only fetch what has not been seen before.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use npsfind::cache::CacheStore;
use npsfind::cli::{Cli, StartupConfig};
use npsfind::data::{NpsClient, PlacesClient};
use npsfind::fetch::Fetcher;
use npsfind::prompt::Explorer;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // RUST_LOG controls the level (e.g. RUST_LOG=debug); cache hits and
    // fetches are reported at info.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so MAPQUEST_API_KEY can come from it
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli)?;

    init_tracing();
    info!(cache = %config.cache_path.display(), "npsfind starting");

    let fetcher = Fetcher::new(CacheStore::open(&config.cache_path));
    let nps = NpsClient::with_base_url(config.base_url);
    let places = PlacesClient::new(config.api_key).with_cache_key(config.places_cache_key);
    let mut explorer = Explorer::new(fetcher, nps, places);

    let regions = explorer
        .build_region_index()
        .await
        .context("Failed to load the state directory")?;

    explorer
        .run(&regions, io::stdin().lock(), io::stdout().lock())
        .await?;

    Ok(())
}
