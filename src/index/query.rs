use crate::config::{Config, QueryConfig};
use crate::index::cursor::{Cursor, PREV_PARAM};
use crate::ConfigError;
use url::Url;

/// Where a crawl attempt begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePoint {
    /// No prior snapshots: the index root, without a `prev` parameter
    Root,
    /// Continue from the highest persisted cursor
    Cursor(Cursor),
}

impl ResumePoint {
    pub fn cursor(self) -> Option<Cursor> {
        match self {
            Self::Root => None,
            Self::Cursor(cursor) => Some(cursor),
        }
    }
}

/// Builds the canonical index URL with the fixed filter parameters
#[derive(Debug, Clone)]
pub struct IndexQuery {
    base_url: Url,
    params: Vec<(String, String)>,
}

impl IndexQuery {
    /// Creates a query from a base URL and filter settings
    ///
    /// Parameters are emitted in a fixed order: category, search, then each
    /// safety toggle set to `on`. An empty search expression is omitted.
    pub fn new(base_url: Url, query: &QueryConfig) -> Self {
        let mut params = vec![("f_cats".to_string(), query.category.clone())];

        if !query.search.is_empty() {
            params.push(("f_search".to_string(), query.search.clone()));
        }

        for toggle in &query.safety_toggles {
            params.push((toggle.clone(), "on".to_string()));
        }

        Self { base_url, params }
    }

    /// Creates the query described by a configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.crawler.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        Ok(Self::new(base_url, &config.query))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The index URL with filters but no cursor
    pub fn root_url(&self) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// The first URL requested by a crawl attempt
    pub fn start_url(&self, resume: ResumePoint) -> Url {
        let mut url = self.root_url();
        if let ResumePoint::Cursor(cursor) = resume {
            url.query_pairs_mut()
                .append_pair(PREV_PARAM, &cursor.to_string());
        }
        url
    }
}
