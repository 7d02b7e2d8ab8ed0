//! Authenticated HTTP session shared by every fetch of a run.
//!
//! Login is a two-step handshake:
//!
//! 1. `GET` the landing page, which sets the session cookies
//! 2. `POST` the credentials as a form to the login endpoint
//!
//! The resulting client keeps its cookie jar and is then only read from.
//! Cookies are scoped per RFC 6265 (domain and path matching), and a cookie
//! whose `Domain` is a public suffix such as `co.uk` or `org` is refused
//! unless it came from that exact host.

use crate::config::FeedConfig;
use crate::errors::FeedError;
use cookie_store::RawCookie;
use publicsuffix::List;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest::{Certificate, Client};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Mozilla's public suffix list, checked when cookies are stored.
const PUBLIC_SUFFIX_LIST: &str = include_str!("../data/public_suffix_list.dat");

/// Cookie jar of a session, rejecting cookies scoped to a public suffix.
#[derive(Debug)]
pub struct SessionCookies(RwLock<cookie_store::CookieStore>);

impl SessionCookies {
    pub fn new(suffixes: List) -> Self {
        Self(RwLock::new(cookie_store::CookieStore::new_with_public_suffix(
            Some(suffixes),
        )))
    }

    /// Jar checking against the bundled public suffix list.
    pub fn with_bundled_suffixes() -> Result<Self, FeedError> {
        let suffixes = PUBLIC_SUFFIX_LIST
            .parse::<List>()
            .map_err(FeedError::PublicSuffixList)?;
        Ok(Self::new(suffixes))
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies = cookie_headers
            .filter_map(|value| value.to_str().ok())
            .filter_map(|raw| RawCookie::parse(raw.to_owned()).ok());
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .store_response_cookies(cookies, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}

/// A logged-in HTTP session.
///
/// Cloning is cheap and shares the same connection pool and cookie jar.
#[derive(Debug, Clone)]
pub struct SessionClient {
    http: Client,
}

impl SessionClient {
    /// Build the HTTP client and run the login handshake.
    ///
    /// # Errors
    ///
    /// Trust-root problems and client construction failures are reported
    /// before any request is sent. Any transport error or non-success status
    /// during the handshake gives [`FeedError::Login`]; there is no partially
    /// authenticated session.
    #[instrument(level = "info", skip_all, fields(login_url = %config.login_url))]
    pub async fn login(config: &FeedConfig) -> Result<Self, FeedError> {
        let t0 = Instant::now();
        let http = build_http_client(config.trust_roots.as_deref(), config.request_timeout())?;
        let session = Self { http };

        if !config.has_credentials() {
            warn!("Logging in with empty username or password");
        }

        info!(url = %config.landing_url, "Getting session cookies");
        session
            .http
            .get(config.landing_url.clone())
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| FeedError::Login {
                stage: "landing page",
                source,
            })?;

        info!(username = %config.credentials.username, "Logging in");
        let form = [
            ("username", config.credentials.username.as_str()),
            ("pass", config.credentials.password.as_str()),
        ];
        session
            .http
            .post(config.login_url.clone())
            .form(&form)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| FeedError::Login {
                stage: "login form",
                source,
            })?;

        info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Session established");
        Ok(session)
    }

    #[cfg(test)]
    pub(crate) fn from_client(http: Client) -> Self {
        Self { http }
    }

    /// Fetch a page body with the session's cookies.
    ///
    /// Non-success statuses are errors.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn fetch_page(&self, url: &Url) -> Result<String, reqwest::Error> {
        let resp = self.http.get(url.clone()).send().await?.error_for_status()?;
        let body = resp.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

/// Build the cookie-carrying client used for a session.
///
/// Cookies go to a [`SessionCookies`] jar. With `trust_roots`, the PEM
/// chain in that file becomes the only set of trusted roots; the built-in
/// roots are switched off.
pub fn build_http_client(
    trust_roots: Option<&Path>,
    timeout: Option<Duration>,
) -> Result<Client, FeedError> {
    let jar = Arc::new(SessionCookies::with_bundled_suffixes()?);
    let mut builder = Client::builder()
        .use_rustls_tls()
        .cookie_provider(jar)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(path) = trust_roots {
        let certs = load_trust_roots(path)?;
        info!(path = %path.display(), count = certs.len(), "Using custom trust roots");
        builder = builder.tls_built_in_root_certs(false);
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }

    builder.build().map_err(FeedError::Client)
}

fn load_trust_roots(path: &Path) -> Result<Vec<Certificate>, FeedError> {
    let pem = std::fs::read(path).map_err(|source| FeedError::TrustRoots {
        path: path.to_path_buf(),
        source,
    })?;
    let certs = Certificate::from_pem_bundle(&pem).map_err(|source| FeedError::Certificate {
        path: path.to_path_buf(),
        source,
    })?;
    if certs.is_empty() {
        return Err(FeedError::EmptyTrustRoots(path.to_path_buf()));
    }
    Ok(certs)
}
