//! Page navigation: load one listing page and turn it into a snapshot

use crate::crawler::fetcher::PageSource;
use crate::crawler::parser::PageExtractor;
use crate::index::Cursor;
use crate::storage::PageSnapshot;
use crate::CrawlError;
use url::Url;

/// A visited page, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatedPage {
    /// Storage key of the page
    pub cursor: Cursor,

    pub snapshot: PageSnapshot,

    /// Parsed form of `snapshot.next_page`
    pub next_url: Option<Url>,
}

/// Loads `url` and extracts its listing
///
/// The cursor comes from the URL's `prev` parameter; pages without one fall
/// back to the cursor reported by the extractor. The next-page link is
/// resolved against `url`. Nothing is returned unless the whole page
/// extracted cleanly.
pub async fn navigate<S, E>(source: &S, extractor: &E, url: &Url) -> Result<NavigatedPage, CrawlError>
where
    S: PageSource + ?Sized,
    E: PageExtractor + ?Sized,
{
    let url_cursor = Cursor::from_url(url).map_err(|value| CrawlError::InvalidCursor {
        url: url.to_string(),
        value,
    })?;

    tracing::debug!("Navigating to {}", url);
    let body = source.fetch(url).await?;

    let extracted = extractor
        .extract(url, &body)
        .map_err(|source| CrawlError::Extraction {
            url: url.to_string(),
            source,
        })?;

    let cursor = url_cursor
        .or(extracted.cursor)
        .ok_or_else(|| CrawlError::MissingCursor {
            url: url.to_string(),
        })?;

    let next_url = extracted
        .next_page
        .as_deref()
        .map(|href| url.join(href))
        .transpose()?;

    Ok(NavigatedPage {
        cursor,
        snapshot: PageSnapshot {
            page: url.to_string(),
            next_page: next_url.as_ref().map(Url::to_string),
            items: extracted.items,
        },
        next_url,
    })
}
