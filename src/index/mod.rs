//! Index addressing
//!
//! Cursors identify listing pages; the query builder turns a resume point
//! into the first URL of a crawl attempt.

mod cursor;
mod query;

pub use cursor::{Cursor, PREV_PARAM, SNAPSHOT_EXTENSION};
pub use query::{IndexQuery, ResumePoint};
