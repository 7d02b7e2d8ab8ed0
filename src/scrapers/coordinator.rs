//! Concurrent fetch of every source over one shared session.
//!
//! One tokio task is spawned per source. Each task owns its response body
//! and returns its own [`SourceResult`]; nothing is shared between tasks
//! except the read-only [`SessionClient`]. Results are only looked at once
//! every task has finished.

use crate::config::SourceErrorPolicy;
use crate::errors::FeedError;
use crate::models::SourceResult;
use crate::scrapers::offers::extract_offers;
use crate::scrapers::source::SourceSpec;
use crate::session::SessionClient;
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Fetch and extract every source concurrently, then join.
///
/// # Arguments
///
/// * `session` - Logged-in session, cloned into each task
/// * `sources` - Sources to fetch, one task each
/// * `now` - Reference time passed to every extraction
/// * `policy` - What to do with a failed source once all tasks are done
///
/// # Returns
///
/// One [`SourceResult`] per successful source, in the order of `sources`.
///
/// # Errors
///
/// With [`SourceErrorPolicy::Abort`], the first failed source (in `sources`
/// order) is returned as [`FeedError::SourceFetch`] or [`FeedError::Task`].
/// This happens after the join, so no task is left running. With
/// [`SourceErrorPolicy::Skip`] this function does not fail.
#[instrument(level = "info", skip_all, fields(sources = sources.len(), ?policy))]
pub async fn fetch_all(
    session: &SessionClient,
    sources: &[SourceSpec],
    now: DateTime<Utc>,
    policy: SourceErrorPolicy,
) -> Result<Vec<SourceResult>, FeedError> {
    let t0 = Instant::now();

    let handles: Vec<_> = sources
        .iter()
        .cloned()
        .map(|source| {
            let session = session.clone();
            tokio::spawn(async move { fetch_source(&session, &source, now).await })
        })
        .collect();

    let joined = join_all(handles).await;

    let mut results = Vec::with_capacity(sources.len());
    for (source, outcome) in sources.iter().zip(joined) {
        let outcome = match outcome {
            Ok(fetched) => fetched,
            Err(join_error) => Err(FeedError::Task {
                name: source.name.clone(),
                source: join_error,
            }),
        };
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => match policy {
                SourceErrorPolicy::Skip => {
                    warn!(source = %source.name, error = %e, "Skipping failed source");
                }
                SourceErrorPolicy::Abort => {
                    error!(source = %source.name, error = %e, "Source failed; aborting run");
                    return Err(e);
                }
            },
        }
    }

    info!(
        fetched = results.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "All sources joined"
    );
    Ok(results)
}

#[instrument(
    level = "info",
    skip_all,
    fields(source = %source.name, url = %source.url, page_size = source.results_per_page)
)]
async fn fetch_source(
    session: &SessionClient,
    source: &SourceSpec,
    now: DateTime<Utc>,
) -> Result<SourceResult, FeedError> {
    let body = session
        .fetch_page(&source.url)
        .await
        .map_err(|e| FeedError::SourceFetch {
            name: source.name.clone(),
            source: e,
        })?;

    let offers = extract_offers(&body, &source.url, now);
    if offers.is_empty() {
        debug!(preview = %truncate_for_log(&body, 300), "No recent offers on page");
    }
    info!(count = offers.len(), "Extracted offers");

    Ok(SourceResult {
        name: source.name.clone(),
        offers,
    })
}
