//! Run configuration.
//!
//! A [`FeedConfig`] is built once at process start, either from defaults or
//! from a YAML file, then overridden by CLI flags (see [`crate::cli`]). It is
//! immutable for the rest of the run and is handed to
//! [`crate::pipeline::Pipeline::new`].
//!
//! # Example
//!
//! ```yaml
//! sources: [GreenwichUK, LewishamUK]
//! page_size: 40
//! credentials:
//!   username: someone
//!   password: secret
//! trust_roots: ./freecycle-org-chain.pem
//! on_source_error: skip
//! ```

use crate::errors::FeedError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Groups queried when no source list is configured.
pub const DEFAULT_SOURCES: [&str; 5] = [
    "GreenwichUK",
    "CityOfLondon",
    "TowerHamletsUK",
    "LewishamUK",
    "SouthwarkUK",
];

/// Results requested per source page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

const DEFAULT_LANDING_URL: &str = "https://my.freecycle.org";
const DEFAULT_LOGIN_URL: &str = "https://my.freecycle.org/login";
const DEFAULT_LISTING_BASE_URL: &str = "https://groups.freecycle.org";

/// What the coordinator does when one source's fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceErrorPolicy {
    /// Fail the whole run, no partial feed.
    #[default]
    Abort,
    /// Log the failing source and build the feed from the rest.
    Skip,
}

/// Login credentials for the session.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything a pipeline run needs to know.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Group names, each becoming one source.
    pub sources: Vec<String>,
    /// `resultsperpage` sent to every source.
    pub page_size: u32,
    pub credentials: Credentials,
    /// PEM chain replacing the built-in trust roots.
    pub trust_roots: Option<PathBuf>,
    /// Page fetched first to pick up session cookies.
    pub landing_url: Url,
    /// Form endpoint receiving the credentials.
    pub login_url: Url,
    /// Scheme and host of the group listing pages.
    pub listing_base_url: Url,
    pub on_source_error: SourceErrorPolicy,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            page_size: DEFAULT_PAGE_SIZE,
            credentials: Credentials::default(),
            trust_roots: None,
            landing_url: static_url(DEFAULT_LANDING_URL),
            login_url: static_url(DEFAULT_LOGIN_URL),
            listing_base_url: static_url(DEFAULT_LISTING_BASE_URL),
            on_source_error: SourceErrorPolicy::default(),
            request_timeout_secs: None,
        }
    }
}

impl FeedConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn has_credentials(&self) -> bool {
        !self.credentials.username.is_empty() && !self.credentials.password.is_empty()
    }
}

fn static_url(s: &str) -> Url {
    Url::parse(s).expect("built-in URL constant is valid")
}

/// Load a [`FeedConfig`] from a YAML file. Missing keys take their defaults.
///
/// # Errors
///
/// [`FeedError::ConfigRead`] if the file cannot be read,
/// [`FeedError::ConfigParse`] if it is not a valid config document.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<FeedConfig, FeedError> {
    let raw = std::fs::read_to_string(path).map_err(|source| FeedError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw).map_err(|source| FeedError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(sources = config.sources.len(), page_size = config.page_size, "Loaded configuration");
    Ok(config)
}

fn parse_config(raw: &str) -> Result<FeedConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(FeedConfig::default());
    }
    serde_yaml::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_london_groups() {
        let config = FeedConfig::default();
        assert_eq!(config.sources.len(), 5);
        assert_eq!(config.sources[0], "GreenwichUK");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.on_source_error, SourceErrorPolicy::Abort);
        assert_eq!(config.listing_base_url.as_str(), "https://groups.freecycle.org/");
        assert_eq!(config.login_url.as_str(), "https://my.freecycle.org/login");
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = parse_config(
            "sources: [LewishamUK]\npage_size: 40\non_source_error: skip\ncredentials:\n  username: alice\n",
        )
        .unwrap();
        assert_eq!(config.sources, vec!["LewishamUK".to_string()]);
        assert_eq!(config.page_size, 40);
        assert_eq!(config.on_source_error, SourceErrorPolicy::Skip);
        assert_eq!(config.credentials.username, "alice");
        assert_eq!(config.credentials.password, "");
        assert!(!config.has_credentials());
        assert_eq!(config.landing_url.as_str(), "https://my.freecycle.org/");
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = parse_config("   \n").unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(parse_config("on_source_error: retry\n").is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/offer_feed.yaml")).unwrap_err();
        assert!(matches!(err, FeedError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("offer_feed_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(&path, "request_timeout_secs: 30\ntrust_roots: /tmp/chain.pem\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.trust_roots, Some(PathBuf::from("/tmp/chain.pem")));

        std::fs::remove_dir_all(&dir).ok();
    }
}
