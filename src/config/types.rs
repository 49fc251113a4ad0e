use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the gallery crawler
///
/// Every section has defaults, so an empty file (or no file) yields a
/// working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub session: SessionConfig,
    pub query: QueryConfig,
    pub retry: RetryConfig,
}

/// What to do when the output directory holds no snapshots yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyOutputPolicy {
    /// Start at the index root without a `prev` parameter
    #[default]
    StartFromRoot,
    /// Fail with `ResumeAmbiguity` instead of guessing
    Refuse,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Base address of the gallery index
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Directory receiving one `<cursor>.json` per visited page
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    #[serde(rename = "empty-output")]
    pub empty_output: EmptyOutputPolicy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://exhentai.org/".to_string(),
            output_dir: PathBuf::from("data/ehentai"),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            empty_output: EmptyOutputPolicy::StartFromRoot,
        }
    }
}

/// Session (cookie) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Environment variable holding the `name=value; ...` credential string
    #[serde(rename = "credential-var")]
    pub credential_var: String,

    /// Domain the cookies are bound to; defaults to the base URL host
    #[serde(rename = "cookie-domain")]
    pub cookie_domain: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credential_var: "EHENTAI_COOKIE".to_string(),
            cookie_domain: None,
        }
    }
}

/// Fixed search/filter parameters of the index query
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Content-category restriction (`f_cats`)
    pub category: String,

    /// Search expression (`f_search`), e.g. a translation-status exclusion
    pub search: String,

    /// Filter toggles sent as `<name>=on`
    #[serde(rename = "safety-toggles")]
    pub safety_toggles: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            category: "1021".to_string(),
            search: "-translated".to_string(),
            safety_toggles: vec![
                "f_sft".to_string(),
                "f_sfu".to_string(),
                "f_sfl".to_string(),
            ],
        }
    }
}

/// Retry policy for failed crawl attempts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Consecutive failed attempts before giving up (0 = never give up)
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "initial-delay-ms")]
    pub initial_delay_ms: u64,

    /// Upper bound for the doubling delay (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
