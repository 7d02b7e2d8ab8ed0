//! Error types for a feed run.
//!
//! Only failures that abort a run live here. Row-level problems inside a
//! listing page (bad timestamp, missing location, unparseable id, missing
//! link) are recovered by the extractor and never surface as errors.

use std::path::PathBuf;

/// Fatal errors that stop a pipeline run before any feed is produced.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid YAML for [`crate::config::FeedConfig`].
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// The configured trust-root file could not be read.
    #[error("failed to read trust roots from {path}: {source}")]
    TrustRoots {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configured trust-root file holds no certificates.
    #[error("no certificates found in trust roots file {0}")]
    EmptyTrustRoots(PathBuf),
    /// The configured trust-root file holds malformed PEM data.
    #[error("invalid certificate in trust roots file {path}: {source}")]
    Certificate {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },
    /// The bundled public suffix list did not parse.
    #[error("invalid public suffix list: {0}")]
    PublicSuffixList(#[source] publicsuffix::Error),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The landing page or the login POST failed.
    #[error("login failed at {stage}: {source}")]
    Login {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// Fetching one source's listing page failed.
    #[error("fetch of source {name} failed: {source}")]
    SourceFetch {
        name: String,
        #[source]
        source: reqwest::Error,
    },
    /// A per-source task panicked or was cancelled.
    #[error("task for source {name} did not complete: {source}")]
    Task {
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_trust_roots_message_names_file() {
        let err = FeedError::EmptyTrustRoots(PathBuf::from("/etc/chain.pem"));
        assert_eq!(
            err.to_string(),
            "no certificates found in trust roots file /etc/chain.pem"
        );
    }

    #[test]
    fn test_config_read_keeps_io_source() {
        use std::error::Error;

        let err = FeedError::ConfigRead {
            path: PathBuf::from("missing.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("missing.yaml"));
        assert!(err.source().is_some());
    }
}
