//! Storage module for persisting page snapshots
//!
//! This module handles writing and reading the per-page JSON snapshots:
//! - Snapshot and listing item records
//! - The `SnapshotStore` trait
//! - A directory-backed JSON implementation with atomic replacement

mod json;
mod traits;

pub use json::JsonSnapshotStore;
pub use traits::{SnapshotStore, StorageError, StorageResult};

use serde::{Deserialize, Serialize};

/// One row of a gallery listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub title: String,
    pub link: String,
    pub date: String,
    pub thumbnail: String,
}

/// Everything persisted for one visited page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Full URL of this page
    pub page: String,

    /// URL of the next page in the chain; `None` ends the traversal
    #[serde(rename = "nextPage")]
    pub next_page: Option<String>,

    /// Listing rows in page order, header excluded
    pub items: Vec<ListingItem>,
}

impl PageSnapshot {
    /// Returns true if this page ends the pagination chain
    pub fn is_terminal(&self) -> bool {
        self.next_page.is_none()
    }
}
