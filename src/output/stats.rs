//! Statistics generation from the snapshot directory
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::index::Cursor;
use crate::storage::SnapshotStore;
use crate::CrawlError;

/// Snapshot directory summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotStatistics {
    /// Number of snapshot files found
    pub snapshots: u64,

    /// Total listing items across readable snapshots
    pub items: u64,

    pub lowest_cursor: Option<Cursor>,

    /// Where the next crawl would resume
    pub highest_cursor: Option<Cursor>,

    /// Snapshots whose `nextPage` is null
    pub terminal_snapshots: Vec<Cursor>,

    /// Snapshots that could not be read or parsed
    pub unreadable: Vec<Cursor>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The snapshot store to summarize
///
/// # Returns
///
/// * `Ok(SnapshotStatistics)` - Successfully loaded statistics
/// * `Err(CrawlError)` - The store could not be listed
pub fn load_statistics(store: &dyn SnapshotStore) -> Result<SnapshotStatistics, CrawlError> {
    let cursors = store.cursors()?;

    let mut stats = SnapshotStatistics {
        snapshots: cursors.len() as u64,
        lowest_cursor: cursors.iter().min().copied(),
        highest_cursor: cursors.iter().max().copied(),
        ..SnapshotStatistics::default()
    };

    for cursor in cursors {
        match store.read(cursor) {
            Ok(Some(snapshot)) => {
                stats.items += snapshot.items.len() as u64;
                if snapshot.is_terminal() {
                    stats.terminal_snapshots.push(cursor);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Skipping snapshot {}: {}", cursor, e);
                stats.unreadable.push(cursor);
            }
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &SnapshotStatistics) {
    println!("=== Snapshot Statistics ===\n");

    println!("Overview:");
    println!("  Snapshots: {}", stats.snapshots);
    println!("  Listing items: {}", stats.items);

    match (stats.lowest_cursor, stats.highest_cursor) {
        (Some(low), Some(high)) => println!("  Cursor range: {} - {}", low, high),
        _ => println!("  Cursor range: (none)"),
    }
    println!();

    if let Some(high) = stats.highest_cursor {
        println!("Next crawl resumes at cursor {}", high);
    } else {
        println!("Next crawl starts from the index root");
    }

    if !stats.terminal_snapshots.is_empty() {
        println!(
            "\nTerminal pages ({}): {}",
            stats.terminal_snapshots.len(),
            join(&stats.terminal_snapshots)
        );
    }

    if !stats.unreadable.is_empty() {
        println!(
            "\nUnreadable snapshots ({}): {}",
            stats.unreadable.len(),
            join(&stats.unreadable)
        );
    }
}

fn join(cursors: &[Cursor]) -> String {
    cursors
        .iter()
        .map(Cursor::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
