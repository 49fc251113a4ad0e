//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the session's cookie store
//! - GET requests for listing pages
//! - Mapping transport and status failures to crawl errors

use crate::config::CrawlerConfig;
use crate::session::Session;
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Anything that can produce the raw content of a listing page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Loads the page at `url` and returns its body
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError>;
}

/// Builds an HTTP client carrying the session cookies
///
/// # Arguments
///
/// * `config` - Crawler settings (base URL, timeouts)
/// * `session` - The authenticated session
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(CrawlError)` - Invalid base URL, unusable cookies or client construction failure
pub fn build_http_client(config: &CrawlerConfig, session: &Session) -> Result<Client, CrawlError> {
    let base_url = Url::parse(&config.base_url)?;
    let cookies = session.cookie_store(&base_url)?;

    let client = Client::builder()
        .user_agent(concat!("gallery-crawler/", env!("CARGO_PKG_VERSION")))
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .cookie_provider(cookies)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Page source backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| CrawlError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })
    }
}
