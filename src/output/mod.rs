//! Output module for reporting on crawl results
//!
//! This module handles summarizing the snapshot directory for the `--stats`
//! command line mode.

pub mod stats;

pub use stats::{load_statistics, print_statistics, SnapshotStatistics};
