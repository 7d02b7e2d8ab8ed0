//! Output writers for a finished [`crate::models::Feed`].
//!
//! # Submodules
//!
//! - [`json`]: Writes the feed to a dated JSON file
//! - [`markdown`]: Renders the feed as a Markdown document
//! - [`rss`]: Renders the feed as an RSS 2.0 channel
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2026-10-14/
//!     └── offers.json
//!
//! markdown_output_dir/
//! └── 2026-10-14.md
//! ```

pub mod json;
pub mod markdown;
pub mod rss;
