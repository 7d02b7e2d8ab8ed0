//! RSS 2.0 rendering of a feed.
//!
//! Each offer becomes one `<item>`; the detail URL doubles as the `guid`,
//! so the same post showing up in two groups yields two items with the
//! same `guid`.

use crate::models::{Feed, Offer};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const CHANNEL_TITLE: &str = "Freecycle offers";
const CHANNEL_LINK: &str = "https://groups.freecycle.org";

/// Render a [`Feed`] as an RSS 2.0 document.
pub fn feed_to_rss(feed: &Feed) -> Result<String, Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("rss").with_attributes([("version", "2.0")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    text_element(&mut writer, "title", CHANNEL_TITLE)?;
    text_element(&mut writer, "link", CHANNEL_LINK)?;
    let sources = feed
        .sources
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    text_element(&mut writer, "description", &format!("Recent offers from {}", sources))?;
    text_element(&mut writer, "lastBuildDate", &feed.generated_at.to_rfc2822())?;

    for offer in &feed.offers {
        write_item(&mut writer, offer)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_item<W: Write>(writer: &mut Writer<W>, offer: &Offer) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;
    text_element(writer, "title", &offer.title)?;
    text_element(writer, "link", offer.detail_url.as_str())?;
    text_element(writer, "guid", offer.detail_url.as_str())?;
    text_element(writer, "pubDate", &offer.posted_at.to_rfc2822())?;
    text_element(writer, "category", &offer.location)?;
    if !offer.summary.is_empty() {
        text_element(writer, "description", &offer.summary)?;
    }
    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write the RSS rendering of `feed` to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_feed(feed: &Feed, path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, feed_to_rss(feed)?).await?;
    info!(items = feed.offers.len(), "Wrote RSS feed");
    Ok(())
}
