//! # offer_feed
//!
//! Aggregates recent "offer" posts from several Freecycle groups into one
//! feed, newest first.
//!
//! ## Usage
//!
//! ```sh
//! FC_USER=me FC_PASS=secret offer_feed -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! Each run is a short pipeline:
//! 1. **Login**: One authenticated session (cookie jar + login form)
//! 2. **Fetching**: Every group's listing page, concurrently, over that session
//! 3. **Extraction**: Offers up to 14 days old from each page
//! 4. **Merge**: All groups' offers in one list, newest first
//! 5. **Output**: JSON, plus Markdown and RSS when requested

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod config;
mod errors;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod session;
mod utils;

use cli::Cli;
use config::{FeedConfig, load_config};
use outputs::{json, markdown, rss};
use pipeline::Pipeline;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("offer_feed starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.json_output_dir, "Parsed CLI arguments");

    let base_config = match &args.config {
        Some(path) => load_config(path)?,
        None => FeedConfig::default(),
    };
    let config = args.apply_to(base_config);
    debug!(?config, "Effective configuration");

    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir.display(),
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Login, fetch, merge ----
    let pipeline = Pipeline::new(config);
    info!(sources = pipeline.sources().len(), "Getting offers");
    let feed = match pipeline.run().await {
        Ok(feed) => feed,
        Err(e) => {
            error!(error = %e, "Feed run failed; no output written");
            return Err(e.into());
        }
    };
    for source in &feed.sources {
        info!(source = %source.name, count = source.count, "Source offers");
    }
    info!(count = feed.offers.len(), "Total offers in feed");

    // ---- Outputs ----
    json::write_feed(&feed, &args.json_output_dir).await?;

    if let Some(dir) = &args.markdown_output_dir {
        if let Err(e) = markdown::write_feed(&feed, dir).await {
            error!(path = %dir.display(), error = %e, "Failed writing Markdown");
        }
    }

    if let Some(path) = &args.rss_output {
        if let Err(e) = rss::write_feed(&feed, path).await {
            error!(path = %path.display(), error = %e, "Failed writing RSS");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
