//! Markdown rendering of a feed.

use crate::models::{Feed, Offer};
use crate::utils::format_post_timestamp;
use std::error::Error;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Render a [`Feed`] as a Markdown document.
///
/// The document starts with the generation time and per-source counts,
/// followed by one section per offer in feed order.
pub fn feed_to_markdown(feed: &Feed) -> String {
    let mut md = String::new();

    writeln!(md, "# Offers\n").unwrap();
    writeln!(
        md,
        "_Generated {}_\n",
        feed.generated_at.format("%Y-%m-%d %H:%M UTC")
    )
    .unwrap();

    for source in &feed.sources {
        writeln!(md, "- **{}**: {} offers", source.name, source.count).unwrap();
    }
    md.push('\n');

    if feed.offers.is_empty() {
        writeln!(md, "No recent offers.").unwrap();
        return md;
    }

    for offer in &feed.offers {
        write_offer(&mut md, offer);
    }
    md
}

fn write_offer(md: &mut String, offer: &Offer) {
    writeln!(md, "## [{}]({})\n", escape_brackets(&offer.title), offer.detail_url).unwrap();
    writeln!(
        md,
        "{} · posted {} ({}) · #{}\n",
        offer.location,
        format_post_timestamp(&offer.posted_at),
        age_label(offer.age_in_days),
        offer.id
    )
    .unwrap();
    if !offer.summary.is_empty() {
        writeln!(md, "{}\n", offer.summary).unwrap();
    }
}

fn age_label(days: i64) -> String {
    match days {
        d if d <= 0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        d => format!("{} days ago", d),
    }
}

fn escape_brackets(title: &str) -> String {
    title.replace('[', "\\[").replace(']', "\\]")
}

/// Write the Markdown rendering to `{markdown_output_dir}/{YYYY-MM-DD}.md`.
#[instrument(level = "info", skip_all, fields(markdown_output_dir = %markdown_output_dir.display()))]
pub async fn write_feed(
    feed: &Feed,
    markdown_output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let path = markdown_output_dir.join(format!("{}.md", feed.generated_at.date_naive()));
    fs::write(&path, feed_to_markdown(feed)).await?;
    info!(path = %path.display(), "Wrote Markdown feed");
    Ok(path)
}
