//! GBFS HTTP client.

use tracing::debug;

use super::error::FetchError;
use super::fetcher::FeedFetcher;
use super::types::FeedKind;

/// Default `station_information` URL (Toronto Bike Share, GBFS v1).
const DEFAULT_INFORMATION_URL: &str =
    "https://tor.publicbikesystem.net/ube/gbfs/v1/en/station_information";

/// Default `station_status` URL (Toronto Bike Share, GBFS v1).
const DEFAULT_STATUS_URL: &str = "https://tor.publicbikesystem.net/ube/gbfs/v1/en/station_status";

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// URL of the `station_information` document
    pub information_url: String,
    /// URL of the `station_status` document
    pub status_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a config for a provider's two feed URLs.
    pub fn new(information_url: impl Into<String>, status_url: impl Into<String>) -> Self {
        Self {
            information_url: information_url.into(),
            status_url: status_url.into(),
            timeout_secs: 30,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INFORMATION_URL, DEFAULT_STATUS_URL)
    }
}

/// Client for a provider's GBFS station feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    information_url: String,
    status_url: String,
}

impl FeedClient {
    /// Create a new feed client.
    pub fn new(config: FeedConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            information_url: config.information_url,
            status_url: config.status_url,
        })
    }

    async fn fetch(&self, feed: FeedKind, url: &str) -> Result<String, FetchError> {
        debug!(%feed, url, "fetching feed");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited(feed));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                feed,
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

impl FeedFetcher for FeedClient {
    async fn fetch_information(&self) -> Result<String, FetchError> {
        self.fetch(FeedKind::Information, &self.information_url).await
    }

    async fn fetch_status(&self) -> Result<String, FetchError> {
        self.fetch(FeedKind::Status, &self.status_url).await
    }
}
