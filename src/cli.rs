//! Command-line interface definitions for offer_feed.
//!
//! Flags override the values of the config file; credentials and the
//! trust-root path can also come from the environment.

use crate::config::{FeedConfig, SourceErrorPolicy};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for offer_feed.
///
/// # Examples
///
/// ```sh
/// # Default London groups, credentials from the environment
/// FC_USER=me FC_PASS=secret offer_feed -j ./json
///
/// # Custom groups with Markdown and RSS output
/// offer_feed -c config.yaml -j ./json -m ./markdown -r ./public/offers.xml \
///     --source GreenwichUK --source LewishamUK
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory for the JSON feed
    #[arg(short, long)]
    pub json_output_dir: PathBuf,

    /// Output directory for the Markdown feed
    #[arg(short, long)]
    pub markdown_output_dir: Option<PathBuf>,

    /// Output file for the RSS feed
    #[arg(short, long)]
    pub rss_output: Option<PathBuf>,

    /// Login username
    #[arg(long, env = "FC_USER")]
    pub username: Option<String>,

    /// Login password
    #[arg(long, env = "FC_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// PEM certificate chain to trust instead of the built-in roots
    #[arg(long, env = "FC_TRUST_ROOTS")]
    pub trust_roots: Option<PathBuf>,

    /// Results requested per group
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Group to query; repeat to list several (replaces the configured list)
    #[arg(long = "source")]
    pub sources: Vec<String>,

    /// Build the feed from the groups that succeed instead of failing the run
    #[arg(long)]
    pub skip_failed_sources: bool,
}

impl Cli {
    /// Apply the flags that were given on top of `config`.
    pub fn apply_to(&self, mut config: FeedConfig) -> FeedConfig {
        if let Some(username) = &self.username {
            config.credentials.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.credentials.password = password.clone();
        }
        if let Some(trust_roots) = &self.trust_roots {
            config.trust_roots = Some(trust_roots.clone());
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if !self.sources.is_empty() {
            config.sources = self.sources.clone();
        }
        if self.skip_failed_sources {
            config.on_source_error = SourceErrorPolicy::Skip;
        }
        config
    }
}
