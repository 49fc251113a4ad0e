//! Storage traits and error types
//!
//! This module defines the trait interface for snapshot stores and
//! associated error types.

use crate::index::Cursor;
use crate::storage::PageSnapshot;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error for {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for snapshot store implementations
///
/// A store maps cursors to snapshots. Writing an existing cursor replaces
/// the previous snapshot entirely.
pub trait SnapshotStore {
    /// Directory the store writes into
    fn root(&self) -> &Path;

    /// Persists a snapshot under its cursor
    ///
    /// # Returns
    ///
    /// The location the snapshot was written to
    fn write(&self, cursor: Cursor, snapshot: &PageSnapshot) -> StorageResult<PathBuf>;

    /// Reads the snapshot stored under a cursor, if any
    fn read(&self, cursor: Cursor) -> StorageResult<Option<PageSnapshot>>;

    /// Lists the cursors of all stored snapshots, in no particular order
    fn cursors(&self) -> StorageResult<Vec<Cursor>>;

    /// Returns the highest stored cursor
    fn latest_cursor(&self) -> StorageResult<Option<Cursor>> {
        Ok(self.cursors()?.into_iter().max())
    }
}
