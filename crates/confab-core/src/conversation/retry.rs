//! Retry policy with exponential backoff.
//!
//! Extracted as a reusable, independently testable policy rather than an ad
//! hoc loop inside the save path. The policy is injected into
//! `ConversationManager`; timing-sensitive tests run under paused tokio time.

use std::future::Future;
use std::time::Duration;

/// Default total number of attempts (initial try plus retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
/// Default backoff multiplier between consecutive delays.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Configuration for retrying a fallible async operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the initial one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay inserted before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

/// The final error of an exhausted retry loop, with the attempt count.
#[derive(Debug)]
pub struct RetryError<E> {
    /// The error returned by the last attempt.
    pub error: E,
    /// Total number of attempts made (1-based).
    pub attempts: u32,
}

impl RetryPolicy {
    /// Returns the delay inserted after the given failed attempt (1-based).
    ///
    /// With the defaults this yields 1000 ms after the first attempt and
    /// 2000 ms after the second.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        Duration::from_millis(millis as u64)
    }

    /// Runs `operation` until it succeeds or `max_attempts` is exhausted,
    /// sleeping the backoff delay between attempts.
    ///
    /// There is no mid-retry cancellation; a run completes or exhausts.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Attempt failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    return Err(RetryError {
                        error,
                        attempts: attempt,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_progression() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<u32, RetryError<String>> = policy
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(format!("transient failure {n}"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_attempt_count() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), RetryError<String>> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("permanent failure".to_string()) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.error, "permanent failure");
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_try_success_sleeps_nothing() {
        let policy = RetryPolicy::default();
        let started = tokio::time::Instant::now();

        let result: Result<u32, RetryError<String>> = policy.run(|| async { Ok(7) }).await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
