//! Network lookup of a channel's display name.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, trace};
use url::Url;

use crate::error::{FetchError, Result};
use crate::handle::Handle;
use crate::title::extract_channel_name;

/// Default site the channel pages are fetched from.
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// Turns a handle into a display name with one network round trip.
///
/// Implementations do no caching and no retrying; the resolver owns both.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the display name for `handle`.
    async fn fetch(&self, handle: &Handle) -> Result<String>;
}

/// Configuration for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Origin the `/<handle>` page is requested from.
    pub base_url: String,
    /// User agent string.
    pub user_agent: String,
    /// Per-request timeout. `None` lets a request run as long as the server
    /// keeps it open.
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("ycnc/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: None,
        }
    }
}

/// Fetches `<base_url>/<handle>` and reads the name out of its `<title>`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a fetcher with custom configuration.
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        // Validate early so a bad base URL fails at startup, not per request.
        Url::parse(&config.base_url)?;

        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Page URL for a handle.
    pub fn channel_url(&self, handle: &Handle) -> Result<Url> {
        Ok(Url::parse(&format!("{}/{}", self.base_url, handle))?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, handle: &Handle) -> Result<String> {
        let url = self.channel_url(handle)?;
        trace!(handle = %handle, url = %url, "Fetching channel page");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let name =
            extract_channel_name(&body).ok_or_else(|| FetchError::NoTitle(handle.to_string()))?;

        debug!(handle = %handle, name = %name, "Fetched channel name");
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(s: &str) -> Handle {
        Handle::parse(s).unwrap()
    }

    #[test]
    fn test_channel_url() {
        let fetcher = HttpFetcher::new().unwrap();
        assert_eq!(
            fetcher.channel_url(&handle("@foo")).unwrap().as_str(),
            "https://www.youtube.com/@foo"
        );
    }

    #[test]
    fn test_trailing_slash_in_base() {
        let fetcher = HttpFetcher::with_config(FetchConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            fetcher.channel_url(&handle("@foo")).unwrap().as_str(),
            "http://localhost:9000/@foo"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpFetcher::with_config(FetchConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let fetcher = HttpFetcher::with_config(FetchConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        })
        .unwrap();

        let err = fetcher.fetch(&handle("@foo")).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }
}
