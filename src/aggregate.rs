//! Merge of per-source results into one feed order.

use crate::models::{Offer, SourceResult};
use itertools::Itertools;

/// Concatenate every source's offers and sort newest first.
///
/// The sort is stable, so offers with equal `posted_at` keep source order,
/// then page order. Offers are not deduplicated: the same post id seen in
/// two groups appears twice.
pub fn merge(results: Vec<SourceResult>) -> Vec<Offer> {
    results
        .into_iter()
        .flat_map(|result| result.offers)
        .sorted_by(|a, b| b.posted_at.cmp(&a.posted_at))
        .collect()
}
