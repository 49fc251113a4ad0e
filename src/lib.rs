//! Gallery Crawler: a resumable walker for an authenticated gallery index
//!
//! This crate follows the backward-linked pagination chain of a gallery index,
//! extracts each page's listing rows and persists them as one JSON snapshot per
//! page. The snapshot directory doubles as the crawl checkpoint.

pub mod config;
pub mod crawler;
pub mod index;
pub mod output;
pub mod session;
pub mod state;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

use crate::index::Cursor;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Extraction failed for {url}: {source}")]
    Extraction {
        url: String,
        source: crawler::ExtractError,
    },

    #[error("Invalid cursor '{value}' in {url}")]
    InvalidCursor { url: String, value: String },

    #[error("No cursor could be determined for {url}")]
    MissingCursor { url: String },

    #[error("Failed to persist snapshot {cursor}: {source}")]
    Persistence {
        cursor: Cursor,
        source: storage::StorageError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("No prior snapshots in {}; refusing to start from the root index", dir.display())]
    ResumeAmbiguity { dir: PathBuf },

    #[error("Cursor {cursor} was visited twice in one attempt (via {url})")]
    CursorCycle { cursor: Cursor, url: String },

    #[error("Giving up after {attempts} consecutive failed attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<CrawlError>,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl CrawlError {
    /// Returns true if the driver may restart the traversal after this error
    ///
    /// Navigation, extraction and persistence failures are treated as
    /// transient. Configuration and session problems, an explicit refusal to
    /// start without prior snapshots, pagination cycles and exhausted retries
    /// are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Config(_)
                | Self::Session(_)
                | Self::ResumeAmbiguity { .. }
                | Self::CursorCycle { .. }
                | Self::RetriesExhausted { .. }
                | Self::Reqwest(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Session-specific errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Credential variable {var} is not set or empty")]
    MissingCredential { var: String },

    #[error("Malformed cookie pair '{pair}': expected name=value")]
    MalformedPair { pair: String },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlReport};
pub use index::{IndexQuery, ResumePoint};
pub use session::{Credential, Session};
pub use storage::{ListingItem, PageSnapshot};
