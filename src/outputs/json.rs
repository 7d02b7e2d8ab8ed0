//! JSON output of a feed.

use crate::models::Feed;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`Feed`] as pretty JSON under a directory named after its date.
///
/// # Arguments
///
/// * `feed` - The merged feed to serialize
/// * `json_output_dir` - Base directory for JSON output
///
/// # Returns
///
/// The path written: `{json_output_dir}/{YYYY-MM-DD}/offers.json`, with the
/// date taken from `feed.generated_at` (UTC).
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_feed(feed: &Feed, json_output_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(feed)?;

    let full_json_dir = json_output_dir.join(feed.generated_at.date_naive().to_string());
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join("offers.json");
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), offers = feed.offers.len(), "Wrote JSON feed");

    Ok(output_json_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceSummary;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_write_feed_uses_dated_directory() {
        let dir = std::env::temp_dir().join(format!("offer_feed_json_{}", std::process::id()));
        let feed = Feed {
            generated_at: Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap(),
            sources: vec![SourceSummary {
                name: "GreenwichUK".to_string(),
                count: 0,
            }],
            offers: Vec::new(),
        };

        let path = write_feed(&feed, &dir).await.unwrap();
        assert_eq!(path, dir.join("2026-10-14").join("offers.json"));

        let written: Feed = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.sources, feed.sources);

        std::fs::remove_dir_all(&dir).ok();
    }
}
