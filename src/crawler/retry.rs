//! Retry policy for failed crawl attempts

use crate::config::RetryConfig;
use std::time::Duration;

/// Bounded exponential backoff between crawl attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failures tolerated; `None` retries forever
    pub max_attempts: Option<u32>,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Returns true if another attempt may follow `failures` consecutive failures
    pub fn allows_retry(&self, failures: u32) -> bool {
        self.max_attempts.map_or(true, |max| failures < max)
    }

    /// Delay before the attempt that follows `failures` consecutive failures
    ///
    /// Doubles from `initial_delay` and is capped at `max_delay`.
    pub fn delay_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }

        let factor = 2u32.saturating_pow(failures - 1);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: (config.max_attempts > 0).then_some(config.max_attempts),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}
