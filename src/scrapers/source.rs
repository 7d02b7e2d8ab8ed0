//! Listing sources and their request URLs.

use crate::config::FeedConfig;
use url::Url;

/// One group to query, with its canonical listing URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: String,
    pub results_per_page: u32,
    pub url: Url,
}

impl SourceSpec {
    pub fn new(name: &str, results_per_page: u32, listing_base_url: &Url) -> Self {
        Self {
            name: name.to_string(),
            results_per_page,
            url: offer_listing_url(listing_base_url, name, results_per_page),
        }
    }

    /// Build one [`SourceSpec`] per configured source name, all sharing the page size.
    pub fn from_config(config: &FeedConfig) -> Vec<Self> {
        config
            .sources
            .iter()
            .map(|name| Self::new(name, config.page_size, &config.listing_base_url))
            .collect()
    }
}

/// Canonical offer listing URL for a group.
///
/// Keeps the scheme and authority of `base` and replaces everything else:
/// `https://groups.freecycle.org` + `GreenwichUK` + `25` gives
/// `https://groups.freecycle.org/GreenwichUK/posts/offer?resultsperpage=25`.
pub fn offer_listing_url(base: &Url, name: &str, page_size: u32) -> Url {
    let mut url = base.clone();
    url.set_path(&format!("/{}/posts/offer", name));
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("resultsperpage", &page_size.to_string());
    url
}
