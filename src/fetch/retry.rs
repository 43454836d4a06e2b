//! Backoff policy for retrying failed fetches.
//!
//! This module provides the [`BackoffPolicy`] and [`FailureType`] types for
//! classifying fetch errors and determining retry behavior.
//!
//! # Overview
//!
//! When a fetch fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - Generic non-2xx status or network trouble; short delay
//! - [`FailureType::RateLimited`] - Explicit rate-limit status; long delay
//! - [`FailureType::Permanent`] - Retrying cannot help (bad URL, malformed body)
//!
//! Both retryable types draw from the same attempt budget, but they never
//! share a delay: a rate-limited client that retries on the short delay gets
//! banned.
//!
//! # Example
//!
//! ```
//! use gb_mirror_core::fetch::{BackoffPolicy, FailureType, FetchError, RetryDecision, classify_error};
//!
//! let policy = BackoffPolicy::default();
//! let error = FetchError::http_status("https://www.giantbomb.com/api/games/", 420);
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::time::Duration;

use tracing::{debug, instrument};

use super::FetchError;
use super::constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RATE_LIMIT_DELAY, DEFAULT_RETRY_DELAY, RATE_LIMIT_STATUSES,
};

/// Classification of fetch failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed after a short wait.
    ///
    /// Examples: 5xx, unexpected 4xx, timeout, connection refused.
    Transient,

    /// The server explicitly told us to slow down (HTTP 420 or 429).
    RateLimited,

    /// Failure that won't succeed regardless of retries.
    ///
    /// Examples: malformed URL, body that is not JSON.
    Permanent,
}

/// Decision on whether to retry a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the fetch after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the fetch.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry budget and delays consumed by the fetcher.
///
/// # Default Values
///
/// - `max_attempts`: 10
/// - `retry_delay`: 30 seconds (transient failures)
/// - `rate_limit_delay`: 600 seconds (rate-limit responses)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay after a transient failure.
    retry_delay: Duration,

    /// Delay after a rate-limit response.
    rate_limit_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
        }
    }
}

impl BackoffPolicy {
    /// Creates a new policy with custom settings.
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum attempts including initial (clamped to >= 1)
    /// * `retry_delay` - Wait after a transient failure
    /// * `rate_limit_delay` - Wait after a rate-limit response
    #[must_use]
    pub fn new(max_attempts: u32, retry_delay: Duration, rate_limit_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
            rate_limit_delay,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for the delays.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay used after transient failures.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Returns the delay used after rate-limit responses.
    #[must_use]
    pub fn rate_limit_delay(&self) -> Duration {
        self.rate_limit_delay
    }

    /// Returns the wait associated with a failure type, or `None` if it is not retryable.
    #[must_use]
    pub fn delay_for(&self, failure_type: FailureType) -> Option<Duration> {
        match failure_type {
            FailureType::Transient => Some(self.retry_delay),
            FailureType::RateLimited => Some(self.rate_limit_delay),
            FailureType::Permanent => None,
        }
    }

    /// Determines whether to retry a failed fetch.
    ///
    /// # Arguments
    ///
    /// * `failure_type` - Classification of the failure
    /// * `attempt` - The attempt number that just failed (1-indexed)
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        let Some(delay) = self.delay_for(failure_type) else {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        };

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            ?failure_type,
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }
}

/// Classifies a fetch error into a failure type for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | HTTP 420 / 429 | RateLimited |
/// | any other HTTP status | Transient |
/// | Timeout, Network | Transient |
/// | Decode, InvalidUrl, Exhausted | Permanent |
#[instrument]
pub fn classify_error(error: &FetchError) -> FailureType {
    match error {
        FetchError::HttpStatus { status, .. } => classify_http_status(*status),
        FetchError::Timeout { .. } | FetchError::Network { .. } => FailureType::Transient,
        FetchError::Decode { .. } | FetchError::InvalidUrl { .. } | FetchError::Exhausted { .. } => {
            FailureType::Permanent
        }
    }
}

/// Classifies an HTTP status code into a failure type.
///
/// The API does not distinguish "gone" from "busy" reliably, so every
/// non-rate-limit status is retried on the short delay.
fn classify_http_status(status: u16) -> FailureType {
    if RATE_LIMIT_STATUSES.contains(&status) {
        FailureType::RateLimited
    } else {
        FailureType::Transient
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== BackoffPolicy Tests ====================

    #[test]
    fn test_backoff_policy_default_values() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_attempts(), 10);
        assert_eq!(policy.retry_delay(), Duration::from_secs(30));
        assert_eq!(policy.rate_limit_delay(), Duration::from_secs(600));
    }

    #[test]
    fn test_backoff_policy_with_max_attempts() {
        let policy = BackoffPolicy::with_max_attempts(4);
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.retry_delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_policy_max_attempts_minimum_is_one() {
        let policy = BackoffPolicy::new(0, Duration::ZERO, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_delay_for_distinguishes_rate_limit() {
        let policy = BackoffPolicy::default();
        assert_eq!(
            policy.delay_for(FailureType::Transient),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            policy.delay_for(FailureType::RateLimited),
            Some(Duration::from_secs(600))
        );
        assert_eq!(policy.delay_for(FailureType::Permanent), None);
    }

    // ==================== Should Retry Decision Tests ====================

    #[test]
    fn test_should_retry_transient_uses_short_delay() {
        let policy = BackoffPolicy::default();
        let decision = policy.should_retry(FailureType::Transient, 1);
        assert_eq!(
            decision,
            RetryDecision::Retry {
                delay: Duration::from_secs(30),
                attempt: 2
            }
        );
    }

    #[test]
    fn test_should_retry_rate_limited_uses_long_delay() {
        let policy = BackoffPolicy::default();
        let decision = policy.should_retry(FailureType::RateLimited, 3);
        assert_eq!(
            decision,
            RetryDecision::Retry {
                delay: Duration::from_secs(600),
                attempt: 4
            }
        );
    }

    #[test]
    fn test_should_retry_permanent_does_not_retry() {
        let policy = BackoffPolicy::default();
        let decision = policy.should_retry(FailureType::Permanent, 1);
        match decision {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("permanent")),
            other => panic!("expected DoNotRetry, got {other:?}"),
        }
    }

    #[test]
    fn test_should_retry_respects_max_attempts() {
        let policy = BackoffPolicy::with_max_attempts(3);

        assert!(matches!(
            policy.should_retry(FailureType::Transient, 1),
            RetryDecision::Retry { .. }
        ));
        assert!(matches!(
            policy.should_retry(FailureType::Transient, 2),
            RetryDecision::Retry { .. }
        ));

        // Rate limiting shares the same attempt budget
        match policy.should_retry(FailureType::RateLimited, 3) {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("exhausted")),
            other => panic!("expected DoNotRetry, got {other:?}"),
        }
    }

    // ==================== Error Classification Tests ====================

    #[test]
    fn test_classify_http_420_rate_limited() {
        let error = FetchError::http_status("http://example.com", 420);
        assert_eq!(classify_error(&error), FailureType::RateLimited);
    }

    #[test]
    fn test_classify_http_429_rate_limited() {
        let error = FetchError::http_status("http://example.com", 429);
        assert_eq!(classify_error(&error), FailureType::RateLimited);
    }

    #[test]
    fn test_classify_generic_statuses_transient() {
        for status in [400, 401, 404, 500, 502, 503] {
            let error = FetchError::http_status("http://example.com", status);
            assert_eq!(
                classify_error(&error),
                FailureType::Transient,
                "status {status}"
            );
        }
    }

    #[test]
    fn test_classify_timeout_transient() {
        let error = FetchError::timeout("http://example.com");
        assert_eq!(classify_error(&error), FailureType::Transient);
    }

    #[test]
    fn test_classify_invalid_url_permanent() {
        let error = FetchError::invalid_url("not-a-url");
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }

    #[test]
    fn test_classify_decode_permanent() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let error = FetchError::decode("http://example.com", source);
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }
}
