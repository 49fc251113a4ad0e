//! Crawler module for walking the gallery index
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the session cookie jar
//! - Listing extraction from page HTML
//! - Page navigation and cursor derivation
//! - Overall crawl coordination with retries

mod coordinator;
mod fetcher;
mod navigator;
mod parser;
mod retry;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, HttpSource, PageSource};
pub use navigator::{navigate, NavigatedPage};
pub use parser::{ExtractError, ExtractedPage, GalleryExtractor, PageExtractor};
pub use retry::RetryPolicy;

use crate::config::Config;
use crate::index::IndexQuery;
use crate::session::{Credential, Session};
use crate::storage::JsonSnapshotStore;
use crate::{ConfigError, CrawlError};

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Read the credential from the configured environment variable
/// 2. Build the session and HTTP client
/// 3. Resume from the highest snapshot in the output directory
/// 4. Follow the pagination chain until a page has no next link
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The chain was exhausted
/// * `Err(CrawlError)` - A fatal error occurred or retries ran out
pub async fn crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    let credential = Credential::from_env(&config.session.credential_var)?;
    let session = Session::from_credential(&credential, config.session.cookie_domain.clone())?;

    crawl_with_session(config, session).await
}

/// Runs a crawl with an already established session
pub async fn crawl_with_session(
    config: Config,
    session: Session,
) -> Result<CrawlReport, CrawlError> {
    let query = IndexQuery::from_config(&config)?;
    let client = build_http_client(&config.crawler, &session)?;
    let extractor = GalleryExtractor::new()
        .map_err(|e| ConfigError::Validation(format!("Invalid listing selector: {}", e)))?;
    let store = JsonSnapshotStore::new(&config.crawler.output_dir);

    tracing::info!(
        "Crawling {} into {} with {} session cookie(s)",
        query.base_url(),
        config.crawler.output_dir.display(),
        session.cookies().len()
    );

    Coordinator::new(HttpSource::new(client), extractor, store, query)
        .with_retry(RetryPolicy::from(&config.retry))
        .with_empty_output(config.crawler.empty_output)
        .run()
        .await
}
