use crate::config::types::{Config, CrawlerConfig, QueryConfig, RetryConfig, SessionConfig};
use crate::session::domain_matches;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let base_url = validate_crawler_config(&config.crawler)?;
    validate_session_config(&config.session, &base_url)?;
    validate_query_config(&config.query)?;
    validate_retry_config(&config.retry)?;
    Ok(())
}

/// Validates crawler configuration, returning the parsed base URL
fn validate_crawler_config(config: &CrawlerConfig) -> Result<Url, ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(url)
}

/// Validates session configuration
fn validate_session_config(config: &SessionConfig, base_url: &Url) -> Result<(), ConfigError> {
    if config.credential_var.trim().is_empty() {
        return Err(ConfigError::Validation(
            "credential-var cannot be empty".to_string(),
        ));
    }

    if let Some(domain) = &config.cookie_domain {
        let host = base_url.host_str().unwrap_or_default();
        if !domain_matches(host, domain) {
            return Err(ConfigError::Validation(format!(
                "cookie-domain '{}' does not cover base-url host '{}'",
                domain, host
            )));
        }
    }

    Ok(())
}

/// Validates the fixed query parameters
fn validate_query_config(config: &QueryConfig) -> Result<(), ConfigError> {
    if config.category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "query category cannot be empty".to_string(),
        ));
    }

    if config.safety_toggles.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "safety-toggles cannot contain empty names".to_string(),
        ));
    }

    Ok(())
}

/// Validates the retry policy
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.initial_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "initial-delay-ms ({}) cannot exceed max-delay-ms ({})",
            config.initial_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}
