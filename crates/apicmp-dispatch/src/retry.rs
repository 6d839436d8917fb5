//! Fixed-backoff retry policy

use std::collections::HashSet;
use std::time::Duration;

/// Attempts per request, including the first one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Wait between two attempts of the same request
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(3);

/// Which statuses are retried, how often and how long to wait in between
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub status_codes: HashSet<u16>,
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            status_codes: HashSet::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(status_codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            status_codes: status_codes.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Whether a response with `status` on attempt number `attempt`
    /// (1-based) should be retried
    pub fn should_retry(&self, status: u16, attempt: u32) -> bool {
        attempt < self.max_attempts && self.status_codes.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_retry_is_capped() {
        let policy = RetryPolicy::new([424, 500]);
        assert!(policy.should_retry(500, 1));
        assert!(policy.should_retry(424, 2));
        assert!(!policy.should_retry(500, 3));
        assert!(!policy.should_retry(200, 1));
    }

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert!(policy.status_codes.is_empty());
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_secs(3));
    }
}
