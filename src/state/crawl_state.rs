//! Driver state definitions for one crawl attempt
//!
//! An attempt moves `Start -> Navigating -> Persisted -> Navigating -> ...`
//! and ends in `Done` when a page has no next link, or in `Failed`.

use crate::index::Cursor;
use crate::CrawlError;
use std::fmt;
use url::Url;

/// Represents where the driver is within one crawl attempt
#[derive(Debug)]
pub enum DriverState {
    /// Resume point not yet computed
    Start,

    /// About to load this page
    Navigating(Url),

    /// A page was written under `cursor`; `next` is where to go from here
    Persisted { cursor: Cursor, next: Option<Url> },

    /// The chain is exhausted
    Done,

    /// The attempt failed
    Failed(CrawlError),
}

impl DriverState {
    /// Returns the state that follows a persisted page
    pub fn after_persist(cursor: Cursor, next: Option<Url>) -> Self {
        Self::Persisted { cursor, next }
    }

    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Navigating(_) => "navigating",
            Self::Persisted { .. } => "persisted",
            Self::Done => "done",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigating(url) => write!(f, "navigating({})", url),
            Self::Persisted { cursor, .. } => write!(f, "persisted({})", cursor),
            Self::Failed(e) => write!(f, "failed({})", e),
            other => f.write_str(other.name()),
        }
    }
}
