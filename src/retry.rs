//! Retry executor for pipeline stages with exponential backoff.
//!
//! Every stage call in the pipeline is wrapped through this executor, as
//! explicit composition: the executor takes an async operation and returns
//! the operation's result with bounded retry/backoff applied. There is no
//! annotation magic; the call site decides the strategy.
//!
//! Backoff state (current delay, attempt counter) lives on the stack of a
//! single `execute` call, so concurrent pipeline calls never share or
//! mutate each other's backoff schedule.
//!
//! # Usage
//!
//! ```ignore
//! use vecflow::retry::RetryExecutor;
//! use vecflow::RetryStrategy;
//!
//! let executor = RetryExecutor::new();
//! let result = executor.execute(
//!     &RetryStrategy::transient_backoff(),
//!     || async { provider.embed_one(text).await },
//! ).await;
//! ```

use crate::error::{RetryStrategy, VectorError};
use std::future::Future;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Executor for retry logic with configurable backoff strategies.
///
/// The executor wraps async operations and automatically retries them
/// according to the specified retry strategy.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    /// Whether retry attempts are logged.
    log_retries: bool,
}

impl RetryExecutor {
    /// Create a new retry executor.
    pub fn new() -> Self {
        Self { log_retries: true }
    }

    /// Create a retry executor without logging.
    pub fn silent() -> Self {
        Self { log_retries: false }
    }

    /// Execute an async operation with automatic retry based on strategy.
    ///
    /// # Arguments
    ///
    /// * `strategy` - The retry strategy to use
    /// * `operation` - Async closure that performs the operation
    ///
    /// # Returns
    ///
    /// The result of the operation, or the last error if all retries fail.
    pub async fn execute<F, Fut, T>(
        &self,
        strategy: &RetryStrategy,
        mut operation: F,
    ) -> Result<T, VectorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, VectorError>>,
    {
        match strategy {
            RetryStrategy::NoRetry => operation().await,

            RetryStrategy::WaitAndRetry { wait } => match operation().await {
                Ok(v) => Ok(v),
                Err(e) => {
                    if self.log_retries {
                        warn!(wait = ?wait, error = %e, "operation failed, waiting before retry");
                    }
                    sleep(*wait).await;
                    operation().await
                }
            },

            RetryStrategy::ExponentialBackoff {
                base_delay,
                max_delay,
                max_attempts,
            } => {
                let mut delay = *base_delay;
                let mut attempts = 0;

                loop {
                    attempts += 1;

                    match operation().await {
                        Ok(v) => {
                            if attempts > 1 && self.log_retries {
                                info!(attempts, "operation succeeded after retry");
                            }
                            return Ok(v);
                        }
                        Err(e) => {
                            if attempts >= *max_attempts {
                                if self.log_retries {
                                    warn!(attempts, error = %e, "operation failed, giving up");
                                }
                                return Err(e);
                            }

                            // A deterministic error won't succeed on retry.
                            if !e.retry_strategy().should_retry() {
                                if self.log_retries {
                                    debug!(error = %e, "error is non-retryable, stopping");
                                }
                                return Err(e);
                            }

                            if self.log_retries {
                                warn!(
                                    attempt = attempts,
                                    max_attempts,
                                    delay = ?delay,
                                    error = %e,
                                    "attempt failed, retrying"
                                );
                            }

                            sleep(delay).await;
                            delay = (delay * 2).min(*max_delay);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_no_retry_succeeds() {
        let executor = RetryExecutor::silent();
        let result = executor
            .execute(&RetryStrategy::NoRetry, || async {
                Ok::<_, VectorError>(42)
            })
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_no_retry_fails_immediately() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute(&RetryStrategy::NoRetry, || {
                let count = call_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(VectorError::Provider("down".to_string()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exponential_backoff_retries() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute(
                &RetryStrategy::ExponentialBackoff {
                    base_delay: Duration::from_millis(1),
                    max_delay: Duration::from_millis(10),
                    max_attempts: 3,
                },
                || {
                    let count = call_count_clone.clone();
                    async move {
                        let attempts = count.fetch_add(1, Ordering::SeqCst) + 1;
                        if attempts < 3 {
                            Err(VectorError::Provider("flaky".to_string()))
                        } else {
                            Ok(42)
                        }
                    }
                },
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exponential_backoff_gives_up() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute(
                &RetryStrategy::ExponentialBackoff {
                    base_delay: Duration::from_millis(1),
                    max_delay: Duration::from_millis(10),
                    max_attempts: 3,
                },
                || {
                    let count = call_count_clone.clone();
                    async move {
                        count.fetch_add(1, Ordering::SeqCst);
                        Err::<i32, _>(VectorError::Provider("always fails".to_string()))
                    }
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_and_retry() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute(
                &RetryStrategy::WaitAndRetry {
                    wait: Duration::from_millis(1),
                },
                || {
                    let count = call_count_clone.clone();
                    async move {
                        let attempts = count.fetch_add(1, Ordering::SeqCst) + 1;
                        if attempts < 2 {
                            Err(VectorError::RateLimited("wait".to_string()))
                        } else {
                            Ok(42)
                        }
                    }
                },
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stops_on_deterministic_error() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute(
                &RetryStrategy::ExponentialBackoff {
                    base_delay: Duration::from_millis(1),
                    max_delay: Duration::from_millis(10),
                    max_attempts: 5,
                },
                || {
                    let count = call_count_clone.clone();
                    async move {
                        count.fetch_add(1, Ordering::SeqCst);
                        Err::<i32, _>(VectorError::DegenerateVector)
                    }
                },
            )
            .await;

        assert!(result.is_err());
        // Stops after the first attempt: a zero-norm input stays zero-norm.
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
