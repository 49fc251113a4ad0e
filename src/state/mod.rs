//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `DriverState`: Where the driver is within a single crawl attempt
//! - `locate_resume_point`: Derives the starting position from persisted snapshots

mod crawl_state;
mod resume;

// Re-export main types
pub use crawl_state::DriverState;
pub use resume::locate_resume_point;
