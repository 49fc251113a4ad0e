//! HTML parser for gallery listing pages
//!
//! This module turns the raw HTML of one listing page into:
//! - The ordered listing rows (header row excluded)
//! - The link to the next page in the backward pagination chain
//! - A fallback cursor for pages whose URL carries none (the index root)
//!
//! Extraction is all-or-nothing: any row missing a field fails the page.

use crate::index::Cursor;
use crate::storage::ListingItem;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while extracting a listing page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Listing container '{selector}' not found")]
    MissingContainer { selector: String },

    #[error("Row {row} has no {field}")]
    MissingField { row: usize, field: &'static str },
}

/// Structured content of one listing page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedPage {
    /// Cursor reported by the page itself, used when the URL has no `prev`
    pub cursor: Option<Cursor>,

    /// Listing rows in page order
    pub items: Vec<ListingItem>,

    /// Raw `href` of the next-page link; `None` on the last page
    pub next_page: Option<String>,
}

/// Turns raw page content into an [`ExtractedPage`]
///
/// Keeping this behind a trait lets the traversal logic run against
/// synthetic pages.
pub trait PageExtractor {
    fn extract(&self, page_url: &Url, html: &str) -> Result<ExtractedPage, ExtractError>;
}

const CONTAINER: &str = ".itg.gltm";
const ROW: &str = "tr";
const TITLE: &str = ".glink";
const LINK: &str = ".glname a";
const DATE: &str = "[id^='posted']";
const THUMBNAIL: &str = ".glthumb img";
const PREV_LINK: &str = "#dprev";
const NEXT_LINK: &str = "#dnext";

/// Query parameter of the forward-pagination link
const NEXT_PARAM: &str = "next";

/// Extractor for the compact gallery listing layout
#[derive(Debug)]
pub struct GalleryExtractor {
    container: Selector,
    row: Selector,
    title: Selector,
    link: Selector,
    date: Selector,
    thumbnail: Selector,
    prev_link: Selector,
    next_link: Selector,
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

impl GalleryExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            container: selector(CONTAINER)?,
            row: selector(ROW)?,
            title: selector(TITLE)?,
            link: selector(LINK)?,
            date: selector(DATE)?,
            thumbnail: selector(THUMBNAIL)?,
            prev_link: selector(PREV_LINK)?,
            next_link: selector(NEXT_LINK)?,
        })
    }

    /// Extracts one listing row; `row` is 1-based, counted after the header
    fn extract_item(
        &self,
        page_url: &Url,
        row: usize,
        element: ElementRef<'_>,
    ) -> Result<ListingItem, ExtractError> {
        let title = text_of(element, &self.title).ok_or(ExtractError::MissingField {
            row,
            field: "title",
        })?;

        let link = attr_of(element, &self.link, &["href"]).ok_or(ExtractError::MissingField {
            row,
            field: "link",
        })?;

        let date = text_of(element, &self.date).ok_or(ExtractError::MissingField {
            row,
            field: "date",
        })?;

        let thumbnail = attr_of(element, &self.thumbnail, &["src", "data-src"]).ok_or(
            ExtractError::MissingField {
                row,
                field: "thumbnail",
            },
        )?;

        Ok(ListingItem {
            title,
            link: absolutize(page_url, &link),
            date,
            thumbnail: absolutize(page_url, &thumbnail),
        })
    }

    /// Reads the `next` parameter of the forward-pagination link
    fn forward_cursor(&self, document: &Html, page_url: &Url) -> Option<Cursor> {
        let href = document
            .select(&self.next_link)
            .next()
            .and_then(|e| e.value().attr("href"))?;
        let url = page_url.join(href.trim()).ok()?;

        url.query_pairs()
            .find(|(key, _)| key == NEXT_PARAM)
            .and_then(|(_, value)| value.parse().ok())
    }
}

impl PageExtractor for GalleryExtractor {
    fn extract(&self, page_url: &Url, html: &str) -> Result<ExtractedPage, ExtractError> {
        let document = Html::parse_document(html);

        let container =
            document
                .select(&self.container)
                .next()
                .ok_or_else(|| ExtractError::MissingContainer {
                    selector: CONTAINER.to_string(),
                })?;

        // First row is the header
        let items = container
            .select(&self.row)
            .skip(1)
            .enumerate()
            .map(|(index, row)| self.extract_item(page_url, index + 1, row))
            .collect::<Result<Vec<_>, _>>()?;

        // A #dprev without href (a plain span) marks the last page
        let next_page = document
            .select(&self.prev_link)
            .next()
            .and_then(|e| e.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string);

        Ok(ExtractedPage {
            cursor: self.forward_cursor(&document, page_url),
            items,
            next_page,
        })
    }
}

/// Trimmed text of the first match, if non-empty
fn text_of(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First present, non-empty attribute of the first match
fn attr_of(element: ElementRef<'_>, selector: &Selector, attrs: &[&str]) -> Option<String> {
    let found = element.select(selector).next()?;
    attrs
        .iter()
        .filter_map(|attr| found.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn absolutize(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}
