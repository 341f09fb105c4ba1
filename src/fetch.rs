//! Page and stylesheet retrieval.
//!
//! The pipeline talks to the network only through the [`PageFetcher`] trait.
//! [`HttpFetcher`] is the production implementation over a pooled
//! `reqwest::Client`; tests substitute an in-memory fetcher.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::config::FetchConfig;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("reading body of {url} failed: {reason}")]
    Body { url: String, reason: String },
}

/// Retrieves the text body of a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the body of a successful (2xx) response.
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError>;
}

/// [`PageFetcher`] backed by `reqwest`.
///
/// Redirects are followed (reqwest's default policy). Every request carries
/// the configured User-Agent and, when `timeout_secs > 0`, a total timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_and_without_timeout() {
        let mut config = FetchConfig::default();
        assert!(HttpFetcher::new(&config).is_ok());
        config.timeout_secs = 0;
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[test]
    fn test_error_messages_name_the_url() {
        let err = FetchError::Status {
            url: "https://example.com/".into(),
            status: 503,
        };
        assert_eq!(err.to_string(), "https://example.com/ returned HTTP 503");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        // Port 9 on loopback (discard) is closed on test machines.
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let err = fetcher.fetch_text(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }), "got {err:?}");
    }
}
