//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Deriving the start position from persisted snapshots
//! - Following the pagination chain one page at a time
//! - Persisting each page before the next one is requested
//! - Restarting failed attempts under a bounded retry policy

use crate::config::EmptyOutputPolicy;
use crate::crawler::fetcher::PageSource;
use crate::crawler::navigator::navigate;
use crate::crawler::parser::PageExtractor;
use crate::crawler::retry::RetryPolicy;
use crate::index::{Cursor, IndexQuery};
use crate::state::{locate_resume_point, DriverState};
use crate::storage::SnapshotStore;
use crate::CrawlError;
use std::collections::HashSet;
use url::Url;

/// Outcome of a completed crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Attempts started, including the successful one
    pub attempts: u32,

    /// Snapshots written across all attempts (rewrites included)
    pub pages_persisted: u64,

    /// Listing items written across all attempts
    pub items_persisted: u64,

    /// Cursor of the last page written
    pub last_cursor: Option<Cursor>,
}

/// Progress made by a single attempt
#[derive(Debug, Default)]
struct AttemptProgress {
    pages: u64,
    items: u64,
    last_cursor: Option<Cursor>,
    highest_cursor: Option<Cursor>,
}

impl AttemptProgress {
    fn record(&mut self, cursor: Cursor, items: usize) {
        self.pages += 1;
        self.items += items as u64;
        self.last_cursor = Some(cursor);
        self.highest_cursor = self.highest_cursor.max(Some(cursor));
    }
}

impl CrawlReport {
    fn absorb(&mut self, progress: &AttemptProgress) {
        self.pages_persisted += progress.pages;
        self.items_persisted += progress.items;
        if progress.last_cursor.is_some() {
            self.last_cursor = progress.last_cursor;
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<S, E, W> {
    source: S,
    extractor: E,
    store: W,
    query: IndexQuery,
    retry: RetryPolicy,
    empty_output: EmptyOutputPolicy,
}

impl<S, E, W> Coordinator<S, E, W>
where
    S: PageSource,
    E: PageExtractor,
    W: SnapshotStore,
{
    /// Creates a coordinator with the default retry and empty-output policies
    pub fn new(source: S, extractor: E, store: W, query: IndexQuery) -> Self {
        Self {
            source,
            extractor,
            store,
            query,
            retry: RetryPolicy::default(),
            empty_output: EmptyOutputPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_empty_output(mut self, policy: EmptyOutputPolicy) -> Self {
        self.empty_output = policy;
        self
    }

    pub fn store(&self) -> &W {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs attempts until the chain is exhausted or a fatal error occurs
    ///
    /// Every attempt starts over from the highest persisted cursor. The
    /// consecutive-failure counter resets whenever an attempt pushed that
    /// cursor forward, so a long crawl with sporadic failures is not cut
    /// short by `max_attempts`.
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        let mut report = CrawlReport::default();
        let mut failures = 0u32;
        let start_time = std::time::Instant::now();

        loop {
            report.attempts += 1;
            let baseline = self.store.latest_cursor();
            if let Err(e) = &baseline {
                tracing::warn!("Could not list snapshots before attempt: {}", e);
            }

            let mut progress = AttemptProgress::default();
            let result = self.run_attempt(&mut progress).await;
            report.absorb(&progress);

            let error = match result {
                Ok(()) => {
                    tracing::info!(
                        "Crawl completed: {} pages ({} items) in {} attempt(s), {:?}",
                        report.pages_persisted,
                        report.items_persisted,
                        report.attempts,
                        start_time.elapsed()
                    );
                    return Ok(report);
                }
                Err(e) if !e.is_recoverable() => {
                    tracing::error!("Crawl aborted: {}", e);
                    return Err(e);
                }
                Err(e) => e,
            };

            // Without a baseline, progress cannot be told apart from a rewrite
            let advanced = match &baseline {
                Ok(before) => progress.highest_cursor > *before,
                Err(_) => false,
            };
            if advanced {
                failures = 0;
            }
            failures += 1;

            if !self.retry.allows_retry(failures) {
                tracing::error!(
                    "Attempt {} failed: {}; no retries left",
                    report.attempts,
                    error
                );
                return Err(CrawlError::RetriesExhausted {
                    attempts: failures,
                    last: Box::new(error),
                });
            }

            let delay = self.retry.delay_for(failures);
            tracing::warn!(
                "Attempt {} failed after {} page(s): {}; restarting from the last snapshot in {:?}",
                report.attempts,
                progress.pages,
                error,
                delay
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Runs one attempt from the resume point to the end of the chain
    async fn run_attempt(&self, progress: &mut AttemptProgress) -> Result<(), CrawlError> {
        let mut visited = HashSet::new();
        let mut state = DriverState::Start;

        loop {
            tracing::trace!("Driver state: {}", state);

            state = match state {
                DriverState::Start => match self.start_url() {
                    Ok(url) => DriverState::Navigating(url),
                    Err(e) => DriverState::Failed(e),
                },
                DriverState::Navigating(url) => {
                    match self.visit(&url, &mut visited, progress).await {
                        Ok(next) => next,
                        Err(e) => DriverState::Failed(e),
                    }
                }
                DriverState::Persisted {
                    next: Some(url), ..
                } => DriverState::Navigating(url),
                DriverState::Persisted { cursor, next: None } => {
                    tracing::info!("Page {} has no next link, chain exhausted", cursor);
                    DriverState::Done
                }
                DriverState::Done => return Ok(()),
                DriverState::Failed(e) => return Err(e),
            };
        }
    }

    fn start_url(&self) -> Result<Url, CrawlError> {
        let resume = locate_resume_point(&self.store, self.empty_output)?;
        let url = self.query.start_url(resume);
        tracing::info!("Starting traversal at {}", url);
        Ok(url)
    }

    /// Loads, extracts and persists one page
    async fn visit(
        &self,
        url: &Url,
        visited: &mut HashSet<Cursor>,
        progress: &mut AttemptProgress,
    ) -> Result<DriverState, CrawlError> {
        let page = navigate(&self.source, &self.extractor, url).await?;

        if !visited.insert(page.cursor) {
            return Err(CrawlError::CursorCycle {
                cursor: page.cursor,
                url: url.to_string(),
            });
        }

        self.store
            .write(page.cursor, &page.snapshot)
            .map_err(|source| CrawlError::Persistence {
                cursor: page.cursor,
                source,
            })?;

        let items = page.snapshot.items.len();
        progress.record(page.cursor, items);
        tracing::info!("Persisted page {} ({} items)", page.cursor, items);

        Ok(DriverState::after_persist(page.cursor, page.next_url))
    }
}
