//! Pipeline error types with retry strategies.
//!
//! # Error Handling Philosophy
//!
//! Errors should be:
//! 1. **Actionable**: Tell the caller what went wrong at which stage
//! 2. **Specific**: Include relevant context (dimensions, stage names)
//! 3. **Recoverable**: Distinguish transient errors (retry) from permanent ones
//!
//! # Retry Strategies
//!
//! Each error type has an associated retry strategy:
//! - `ExponentialBackoff`: For transient capability failures
//! - `WaitAndRetry`: For rate-limited external capabilities
//! - `NoRetry`: For deterministic errors (degenerate input, bad config)
//!
//! The pipeline itself never surfaces these errors past `process` /
//! `batch_process`; they are absorbed into the documented fallback result.
//! See [`crate::pipeline`] for the fail-soft boundary.

use std::time::Duration;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, VectorError>;

// ============================================================================
// Retry Strategy
// ============================================================================

/// Strategy for retrying failed stage operations.
///
/// Each error type maps to an appropriate retry strategy based on
/// whether the error is transient (retry) or deterministic (no retry).
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Retry with exponential backoff (for transient errors).
    ExponentialBackoff {
        /// Initial delay before first retry.
        base_delay: Duration,
        /// Maximum delay between retries.
        max_delay: Duration,
        /// Maximum number of attempts (including the first).
        max_attempts: u32,
    },

    /// Wait for a specific duration then retry once (for rate limits).
    WaitAndRetry {
        /// Duration to wait before retrying.
        wait: Duration,
    },

    /// Do not retry at all (deterministic error).
    NoRetry,
}

impl RetryStrategy {
    /// Standard exponential backoff for transient capability failures.
    pub fn transient_backoff() -> Self {
        Self::ExponentialBackoff {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            max_attempts: 3,
        }
    }

    /// Check if this strategy allows retrying.
    pub fn should_retry(&self) -> bool {
        !matches!(self, Self::NoRetry)
    }

    /// Number of attempts this strategy permits.
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::ExponentialBackoff { max_attempts, .. } => *max_attempts,
            Self::WaitAndRetry { .. } => 2,
            Self::NoRetry => 1,
        }
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::transient_backoff()
    }
}

// ============================================================================
// Pipeline Error Types
// ============================================================================

/// Errors that can occur in pipeline operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// The embedding capability failed (inference error, capability down).
    #[error("embedding provider error: {0}")]
    Provider(String),

    /// The embedding capability is rate limiting us.
    #[error("embedding provider rate limited: {0}")]
    RateLimited(String),

    /// A provider returned a vector of the wrong dimensionality.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A zero-norm vector cannot be normalized. The refiner raises this
    /// instead of silently passing the zero vector through; the pipeline
    /// fallback path absorbs it.
    #[error("cannot normalize a zero-norm vector")]
    DegenerateVector,

    /// A stage exhausted its retries (or failed deterministically).
    /// Caught at the `process` boundary and converted to the fallback result.
    #[error("stage '{stage}' failed after retries: {source}")]
    StageFailed {
        stage: &'static str,
        #[source]
        source: Box<VectorError>,
    },

    /// The per-call deadline expired. Treated identically to stage failure.
    #[error("pipeline deadline exceeded")]
    DeadlineExceeded,

    /// The batch join mechanism itself failed (not an individual item).
    #[error("batch join failed: {0}")]
    BatchJoin(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unknown error.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl VectorError {
    /// Get the appropriate retry strategy for this error.
    ///
    /// Deterministic errors (degenerate input, dimension mismatch, bad
    /// config) are never retried: re-running the same computation on the
    /// same input cannot succeed.
    ///
    /// # Example
    ///
    /// ```
    /// use vecflow::{RetryStrategy, VectorError};
    ///
    /// let error = VectorError::Provider("capability down".to_string());
    /// assert!(error.retry_strategy().should_retry());
    ///
    /// let error = VectorError::DegenerateVector;
    /// assert_eq!(error.retry_strategy(), RetryStrategy::NoRetry);
    /// ```
    pub fn retry_strategy(&self) -> RetryStrategy {
        match self {
            // Transient capability failures - retry with backoff
            Self::Provider(_) | Self::Unknown(_) => RetryStrategy::transient_backoff(),

            // Rate limiting - wait then retry once
            Self::RateLimited(_) => RetryStrategy::WaitAndRetry {
                wait: Duration::from_secs(1),
            },

            // Deterministic errors - no retry
            Self::DimensionMismatch { .. }
            | Self::DegenerateVector
            | Self::StageFailed { .. }
            | Self::DeadlineExceeded
            | Self::BatchJoin(_)
            | Self::Config(_) => RetryStrategy::NoRetry,
        }
    }

    /// Check if this error is recoverable (can be retried).
    pub fn is_recoverable(&self) -> bool {
        self.retry_strategy().should_retry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = VectorError::Provider("capability down".to_string());
        assert_eq!(
            error.to_string(),
            "embedding provider error: capability down"
        );

        let error = VectorError::DimensionMismatch {
            expected: 384,
            got: 128,
        };
        assert_eq!(
            error.to_string(),
            "dimension mismatch: expected 384, got 128"
        );

        let error = VectorError::DegenerateVector;
        assert_eq!(error.to_string(), "cannot normalize a zero-norm vector");
    }

    #[test]
    fn test_stage_failed_carries_source() {
        let error = VectorError::StageFailed {
            stage: "embedding",
            source: Box::new(VectorError::Provider("down".to_string())),
        };
        assert!(error.to_string().contains("embedding"));
        assert!(error.to_string().contains("down"));
    }

    #[test]
    fn test_provider_error_retry_strategy() {
        let error = VectorError::Provider("flaky".to_string());
        let strategy = error.retry_strategy();

        match strategy {
            RetryStrategy::ExponentialBackoff { max_attempts, .. } => {
                assert_eq!(max_attempts, 3);
            }
            _ => panic!("Expected ExponentialBackoff for provider error"),
        }
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_rate_limited_retry_strategy() {
        let error = VectorError::RateLimited("slow down".to_string());
        let strategy = error.retry_strategy();

        match strategy {
            RetryStrategy::WaitAndRetry { wait } => {
                assert_eq!(wait, Duration::from_secs(1));
            }
            _ => panic!("Expected WaitAndRetry for rate limit"),
        }
        assert!(strategy.should_retry());
    }

    #[test]
    fn test_degenerate_vector_no_retry() {
        let error = VectorError::DegenerateVector;
        assert_eq!(error.retry_strategy(), RetryStrategy::NoRetry);
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_dimension_mismatch_no_retry() {
        let error = VectorError::DimensionMismatch {
            expected: 384,
            got: 3,
        };
        assert_eq!(error.retry_strategy(), RetryStrategy::NoRetry);
    }

    #[test]
    fn test_deadline_exceeded_no_retry() {
        assert!(!VectorError::DeadlineExceeded.is_recoverable());
    }

    #[test]
    fn test_config_error_no_retry() {
        let error = VectorError::Config("bad dimension".to_string());
        assert_eq!(error.retry_strategy(), RetryStrategy::NoRetry);
    }

    #[test]
    fn test_unknown_error_is_transient() {
        let error = VectorError::Unknown("mystery".to_string());
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_strategy_max_attempts() {
        assert_eq!(RetryStrategy::transient_backoff().max_attempts(), 3);
        assert_eq!(RetryStrategy::NoRetry.max_attempts(), 1);
        assert_eq!(
            RetryStrategy::WaitAndRetry {
                wait: Duration::from_millis(1)
            }
            .max_attempts(),
            2
        );
    }

    #[test]
    fn test_strategy_equality() {
        let s1 = RetryStrategy::transient_backoff();
        let s2 = RetryStrategy::transient_backoff();
        assert_eq!(s1, s2);
        assert_ne!(s1, RetryStrategy::NoRetry);
    }

    #[test]
    fn test_default_strategy_is_transient_backoff() {
        assert_eq!(RetryStrategy::default(), RetryStrategy::transient_backoff());
    }
}
