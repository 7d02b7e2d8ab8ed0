//! Offer extraction from a group's listing page.
//!
//! A listing page carries one `#group_posts_table` whose rows look like:
//!
//! ```html
//! <tr>
//!   <td>Tue Oct 13 09:15:00 2026<br><a href="...">OFFER</a></td>
//!   <td>
//!     <a href="https://groups.freecycle.org/GreenwichUK/posts/12345678/sofa">Free sofa</a>
//!     (Greenwich SE10) <br>
//!     Two seater, collection only
//!   </td>
//! </tr>
//! ```
//!
//! The markup is loose and changes without notice, so every field has a
//! fallback and a broken row never aborts the page.

use crate::models::{Offer, UNKNOWN_LOCATION};
use crate::utils::{age_in_days, parse_post_timestamp};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Offers older than this many whole days end a page's extraction.
pub const RECENCY_CUTOFF_DAYS: i64 = 14;

const POSTS_SEGMENT: &str = "/posts/";
const OFFER_ID_LEN: usize = 8;

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#group_posts_table tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

enum Row {
    Kept(Offer),
    Skipped(&'static str),
    TooOld(i64),
}

/// Extract the recent offers of one listing page.
///
/// Rows are visited in document order and **must be newest-first**: the
/// first row older than [`RECENCY_CUTOFF_DAYS`] ends extraction, and every
/// row after it is ignored without being looked at. Rows without a usable
/// detail link are skipped and extraction carries on.
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `page_url` - URL the page was fetched from, used to resolve relative links
/// * `now` - Reference time for ages and for rows whose date does not parse
///
/// # Returns
///
/// The offers built, in page order. Every offer has
/// `age_in_days <= RECENCY_CUTOFF_DAYS`.
#[instrument(level = "debug", skip_all, fields(page = %page_url))]
pub fn extract_offers(html: &str, page_url: &Url, now: DateTime<Utc>) -> Vec<Offer> {
    let document = Html::parse_document(html);
    let mut offers = Vec::new();

    for (index, row) in document.select(&ROW_SELECTOR).enumerate() {
        match extract_row(row, page_url, now) {
            Row::Kept(offer) => offers.push(offer),
            Row::Skipped(reason) => debug!(index, reason, "Skipping listing row"),
            Row::TooOld(days) => {
                debug!(index, days, "Reached offers past the recency cutoff");
                break;
            }
        }
    }

    debug!(count = offers.len(), "Extracted offers");
    offers
}

fn extract_row(row: ElementRef<'_>, page_url: &Url, now: DateTime<Utc>) -> Row {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL_SELECTOR).collect();
    let (date_cell, details_cell) = (cells.first(), cells.last());

    let posted_at = date_cell
        .and_then(|cell| alphabetic_texts(*cell).into_iter().next())
        .and_then(parse_post_timestamp)
        .unwrap_or(now);
    let age = age_in_days(&posted_at, &now);
    if age > RECENCY_CUTOFF_DAYS {
        return Row::TooOld(age);
    }

    let Some(details_cell) = details_cell else {
        return Row::Skipped("no cells");
    };
    let Some(link) = details_cell.select(&LINK_SELECTOR).next() else {
        return Row::Skipped("no link");
    };
    let Some(href) = link.value().attr("href").map(str::trim).filter(|h| !h.is_empty()) else {
        return Row::Skipped("link without href");
    };
    let Ok(detail_url) = page_url.join(href) else {
        return Row::Skipped("unresolvable href");
    };

    let texts = alphabetic_texts(*details_cell);
    let location = texts
        .first()
        .map(|t| parse_location(t))
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
    let summary = texts.get(1).map(|t| t.trim().to_string()).unwrap_or_default();

    Row::Kept(Offer {
        title: link.text().collect::<String>().trim().to_string(),
        location,
        summary,
        id: parse_offer_id(&detail_url),
        posted_at,
        age_in_days: age,
        detail_url,
    })
}

/// Direct text children of `cell` that contain a lowercase ASCII letter.
///
/// Text inside child elements (links, `<br>`, spans) is not included, nor
/// is text like `(SE10)` made only of capitals, digits and punctuation.
fn alphabetic_texts<'a>(cell: ElementRef<'a>) -> Vec<&'a str> {
    cell.children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .filter(|text| text.bytes().any(|b| b.is_ascii_lowercase()))
        .collect()
}

/// The text strictly between the first `(` and the first `)`.
///
/// Returns [`UNKNOWN_LOCATION`] when either is missing, or when the `)`
/// does not leave at least one character after the `(`.
pub fn parse_location(text: &str) -> String {
    match (text.find('('), text.find(')')) {
        (Some(open), Some(close)) if close >= open + 2 => text[open + 1..close].to_string(),
        _ => UNKNOWN_LOCATION.to_string(),
    }
}

/// Post id: the 8 characters right after the first `/posts/` of the path.
///
/// Returns `0` when the segment is missing, too short, or not a number.
pub fn parse_offer_id(url: &Url) -> u64 {
    let path = url.path();
    path.find(POSTS_SEGMENT)
        .map(|at| at + POSTS_SEGMENT.len())
        .and_then(|start| path.get(start..start + OFFER_ID_LEN))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}
