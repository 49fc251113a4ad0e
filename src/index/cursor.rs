use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use url::Url;

/// Query parameter carrying the backward-pagination cursor
pub const PREV_PARAM: &str = "prev";

/// Extension used for snapshot files
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Backward-pagination reference of one listing page
///
/// The same value names the page in URLs (`?prev=<cursor>`) and on disk
/// (`<cursor>.json`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(u64);

impl Cursor {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Reads the `prev` parameter of a page URL
    ///
    /// Returns `Ok(None)` when the parameter is absent and `Err` with the raw
    /// value when it is present but not an unsigned integer.
    pub fn from_url(url: &Url) -> Result<Option<Self>, String> {
        let Some((_, raw)) = url.query_pairs().find(|(key, _)| key == PREV_PARAM) else {
            return Ok(None);
        };

        raw.trim()
            .parse::<Self>()
            .map(Some)
            .map_err(|_| raw.into_owned())
    }

    /// Parses the leading integer of a snapshot file name
    ///
    /// Everything before the first `.` must be an unsigned integer, so
    /// `1532.json` yields 1532 while `.tmpXYZ`, `notes.txt` or `12a.json`
    /// yield nothing.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let prefix = name.split('.').next()?;
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        prefix.parse().ok()
    }

    /// File name this cursor's snapshot is stored under
    pub fn file_name(self) -> String {
        format!("{}.{}", self.0, SNAPSHOT_EXTENSION)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cursor {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}
