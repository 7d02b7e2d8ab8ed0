//! One end-to-end feed run: login, concurrent fetch, merge.

use crate::aggregate::merge;
use crate::config::FeedConfig;
use crate::errors::FeedError;
use crate::models::{Feed, SourceSummary};
use crate::scrapers::coordinator::fetch_all;
use crate::scrapers::source::SourceSpec;
use crate::session::SessionClient;
use chrono::Utc;
use tracing::{info, instrument};

/// A configured feed pipeline. Each [`Pipeline::run`] starts from scratch.
#[derive(Debug)]
pub struct Pipeline {
    config: FeedConfig,
    sources: Vec<SourceSpec>,
}

impl Pipeline {
    pub fn new(config: FeedConfig) -> Self {
        let sources = SourceSpec::from_config(&config);
        Self { config, sources }
    }

    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    /// Log in, fetch every source, and merge the offers.
    ///
    /// Login finishes before any fetch starts. A single "now" is taken at
    /// the start of the run and used for every offer's age.
    ///
    /// # Errors
    ///
    /// Any [`FeedError`] from login, or from a source fetch when the
    /// configured policy is [`crate::config::SourceErrorPolicy::Abort`].
    #[instrument(level = "info", skip_all, fields(sources = self.sources.len()))]
    pub async fn run(&self) -> Result<Feed, FeedError> {
        let now = Utc::now();
        let session = SessionClient::login(&self.config).await?;

        let results = fetch_all(&session, &self.sources, now, self.config.on_source_error).await?;
        let sources = results
            .iter()
            .map(|r| SourceSummary {
                name: r.name.clone(),
                count: r.offers.len(),
            })
            .collect();

        let offers = merge(results);
        info!(count = offers.len(), "Merged offers");

        Ok(Feed {
            generated_at: now,
            sources,
            offers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, SourceErrorPolicy};
    use crate::utils::format_post_timestamp;
    use chrono::Duration;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, sources: &[&str]) -> FeedConfig {
        let base = Url::parse(&server.uri()).unwrap();
        FeedConfig {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            credentials: Credentials {
                username: "alice".to_string(),
                password: "s3cret".to_string(),
            },
            landing_url: base.clone(),
            login_url: base.join("/login").unwrap(),
            listing_base_url: base,
            ..FeedConfig::default()
        }
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "fc=1; Path=/"))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    fn single_row_page(group: &str, id: &str, hours_ago: i64) -> String {
        let posted = Utc::now() - Duration::hours(hours_ago);
        format!(
            "<table id=\"group_posts_table\"><tr><td>{}</td><td><a href=\"/{}/posts/{}/x\">{}</a> (Town) <br> desc</td></tr></table>",
            format_post_timestamp(&posted),
            group,
            id,
            group
        )
    }

    #[tokio::test]
    async fn test_run_merges_sources_without_dedup() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        for (group, hours_ago) in [("GreenwichUK", 30), ("LewishamUK", 3)] {
            Mock::given(method("GET"))
                .and(path(format!("/{}/posts/offer", group)))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(single_row_page(group, "12345678", hours_ago)),
                )
                .mount(&server)
                .await;
        }

        let pipeline = Pipeline::new(config_for(&server, &["GreenwichUK", "LewishamUK"]));
        let feed = pipeline.run().await.unwrap();

        assert_eq!(feed.offers.len(), 2);
        assert!(feed.offers.iter().all(|o| o.id == 12345678));
        assert_eq!(feed.offers[0].title, "LewishamUK");
        assert_eq!(feed.offers[1].title, "GreenwichUK");
        assert_eq!(feed.offers[1].age_in_days, 1);
        assert_eq!(
            feed.sources,
            vec![
                SourceSummary { name: "GreenwichUK".into(), count: 1 },
                SourceSummary { name: "LewishamUK".into(), count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_run_fails_without_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/GreenwichUK/posts/offer"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let pipeline = Pipeline::new(config_for(&server, &["GreenwichUK"]));
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, FeedError::Login { .. }));
    }

    #[tokio::test]
    async fn test_run_with_skip_policy_returns_partial_feed() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/GreenwichUK/posts/offer"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(single_row_page("GreenwichUK", "00000007", 1)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/LewishamUK/posts/offer"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut config = config_for(&server, &["GreenwichUK", "LewishamUK"]);
        config.on_source_error = SourceErrorPolicy::Skip;
        let feed = Pipeline::new(config).run().await.unwrap();

        assert_eq!(feed.offers.len(), 1);
        assert_eq!(feed.offers[0].id, 7);
        assert_eq!(feed.sources.len(), 1);
    }

    #[test]
    fn test_new_builds_sources_from_config() {
        let pipeline = Pipeline::new(FeedConfig::default());
        assert_eq!(pipeline.sources().len(), 5);
        assert_eq!(
            pipeline.sources()[0].url.as_str(),
            "https://groups.freecycle.org/GreenwichUK/posts/offer?resultsperpage=25"
        );
    }
}
