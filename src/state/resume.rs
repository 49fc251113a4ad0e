//! Resume locator
//!
//! The snapshot directory is the only record of progress. The highest cursor
//! found there is where the next attempt starts.

use crate::config::EmptyOutputPolicy;
use crate::index::ResumePoint;
use crate::storage::SnapshotStore;
use crate::CrawlError;

/// Computes where a crawl attempt should start
///
/// # Arguments
///
/// * `store` - The snapshot store to inspect
/// * `policy` - What to do when the store is empty
///
/// # Returns
///
/// * `Ok(ResumePoint::Cursor(max))` - Highest persisted cursor
/// * `Ok(ResumePoint::Root)` - Store is empty and the policy allows a root start
/// * `Err(CrawlError::ResumeAmbiguity)` - Store is empty and the policy refuses
pub fn locate_resume_point(
    store: &dyn SnapshotStore,
    policy: EmptyOutputPolicy,
) -> Result<ResumePoint, CrawlError> {
    match store.latest_cursor()? {
        Some(cursor) => {
            tracing::info!("Resuming from cursor {}", cursor);
            Ok(ResumePoint::Cursor(cursor))
        }
        None => match policy {
            EmptyOutputPolicy::StartFromRoot => {
                tracing::info!(
                    "No snapshots in {}, starting from the index root",
                    store.root().display()
                );
                Ok(ResumePoint::Root)
            }
            EmptyOutputPolicy::Refuse => Err(CrawlError::ResumeAmbiguity {
                dir: store.root().to_path_buf(),
            }),
        },
    }
}
