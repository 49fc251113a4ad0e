//! Directory-backed JSON snapshot store
//!
//! Each snapshot lives in `<output-dir>/<cursor>.json`. Writes go through a
//! temporary file in the same directory that is renamed over the target, so
//! readers never see a half-written snapshot. Temporary names start with `.`
//! and therefore never parse as a cursor.

use crate::index::Cursor;
use crate::storage::traits::{SnapshotStore, StorageError, StorageResult};
use crate::storage::PageSnapshot;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Snapshot store writing pretty-printed JSON files into one directory
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    dir: PathBuf,
}

impl JsonSnapshotStore {
    /// Creates a store rooted at `dir`
    ///
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot stored under `cursor`
    pub fn path_for(&self, cursor: Cursor) -> PathBuf {
        self.dir.join(cursor.file_name())
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn root(&self) -> &Path {
        &self.dir
    }

    fn write(&self, cursor: Cursor, snapshot: &PageSnapshot) -> StorageResult<PathBuf> {
        let path = self.path_for(cursor);

        std::fs::create_dir_all(&self.dir).map_err(|e| self.io_error(&self.dir, e))?;

        let mut temp_file =
            NamedTempFile::new_in(&self.dir).map_err(|e| self.io_error(&self.dir, e))?;

        serde_json::to_writer_pretty(&mut temp_file, snapshot).map_err(|source| {
            StorageError::Serialization {
                path: path.clone(),
                source,
            }
        })?;
        temp_file
            .write_all(b"\n")
            .and_then(|_| temp_file.flush())
            .map_err(|e| self.io_error(&path, e))?;

        // Atomic rename; replaces any previous snapshot for this cursor
        temp_file
            .persist(&path)
            .map_err(|e| self.io_error(&path, e.error))?;

        tracing::debug!(
            "Wrote snapshot {} ({} items) to {}",
            cursor,
            snapshot.items.len(),
            path.display()
        );

        Ok(path)
    }

    fn read(&self, cursor: Cursor) -> StorageResult<Option<PageSnapshot>> {
        let path = self.path_for(cursor);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(&path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Serialization { path, source })
    }

    fn cursors(&self) -> StorageResult<Vec<Cursor>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(&self.dir, e)),
        };

        let mut cursors = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error(&self.dir, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| self.io_error(&entry.path(), e))?;
            if file_type.is_dir() {
                continue;
            }

            let name = entry.file_name();
            match name.to_str().and_then(Cursor::from_file_name) {
                Some(cursor) => cursors.push(cursor),
                None => tracing::trace!("Ignoring non-snapshot file {:?}", name),
            }
        }

        cursors.sort_unstable();
        cursors.dedup();
        Ok(cursors)
    }
}
