//! Data models for extracted offers and the feed built from them.
//!
//! - [`Offer`]: one normalized listing row
//! - [`SourceResult`]: the offers of one source for one run
//! - [`Feed`]: the merged, ordered output of a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Location used when a listing's location text has no `(...)` span.
pub const UNKNOWN_LOCATION: &str = "UNKNOWN";

/// A single offer listing, as extracted from a group's listing page.
///
/// Offers are immutable once built. Fields that the page does not yield
/// cleanly take sentinel values instead of failing the row: `id` is `0`,
/// `location` is [`UNKNOWN_LOCATION`], and `posted_at` is the time of the
/// run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Offer {
    /// Headline text of the listing link.
    pub title: String,
    /// Free-text location, or [`UNKNOWN_LOCATION`].
    pub location: String,
    /// Trimmed description text.
    pub summary: String,
    /// Numeric post id from the detail URL, `0` if not parseable.
    pub id: u64,
    /// When the listing was posted.
    pub posted_at: DateTime<Utc>,
    /// Whole days between `posted_at` and the run's "now".
    pub age_in_days: i64,
    /// Link to the full listing.
    pub detail_url: Url,
}

/// Offers collected from one source during one run.
///
/// Owned by the coordinator run that produced it and rebuilt from scratch
/// on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResult {
    /// The source (group) name.
    pub name: String,
    /// Offers in page order, newest first.
    pub offers: Vec<Offer>,
}

/// Per-source line of a [`Feed`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceSummary {
    pub name: String,
    pub count: usize,
}

/// The result of one pipeline run, handed to the output writers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Feed {
    /// The "now" used for every age computation in the run.
    pub generated_at: DateTime<Utc>,
    /// Sources that contributed, in configured order.
    pub sources: Vec<SourceSummary>,
    /// All offers, newest first.
    pub offers: Vec<Offer>,
}
