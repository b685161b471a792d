//! Retry policy for transient upstream failures
//!
//! The default is a fixed schedule: up to three retries, one second apart.
//! Backoff growth and jitter are available but off unless configured.

use rand::{RngExt, rng};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum retries after the first attempt
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_backoff: Duration,

    /// Maximum backoff duration
    pub max_backoff: Duration,

    /// Backoff multiplier (1.0 keeps the delay fixed)
    pub multiplier: f64,

    /// Add up to 30% jitter to each delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(1),
            multiplier: 1.0,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Fixed delay between every attempt
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff: delay,
            max_backoff: delay,
            multiplier: 1.0,
            jitter: false,
        }
    }

    /// Create retry policy from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: std::env::var("RIVALS_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            initial_backoff: std::env::var("RIVALS_RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.initial_backoff, Duration::from_millis),
            max_backoff: std::env::var("RIVALS_MAX_RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.max_backoff, Duration::from_millis),
            multiplier: std::env::var("RIVALS_RETRY_MULTIPLIER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.multiplier),
            jitter: std::env::var("RIVALS_RETRY_JITTER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jitter),
        }
    }

    /// Execute a function with retry logic.
    ///
    /// Errors for which [`ApiError::should_retry`](crate::ApiError::should_retry)
    /// is false are returned immediately. Once retries are exhausted the last
    /// error is returned.
    pub async fn execute<F, Fut, T>(&self, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;

        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.should_retry() || attempt >= self.max_attempts => {
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    tracing::warn!(attempt, max = self.max_attempts, "Attempt failed: {e}");

                    let mut delay = backoff.min(self.max_backoff.max(self.initial_backoff));
                    if self.jitter {
                        let jitter = rng().random_range(0.0..0.3);
                        #[allow(clippy::cast_precision_loss)]
                        let jitter_ms = (delay.as_millis() as f64 * jitter) as u64;
                        delay += Duration::from_millis(jitter_ms);
                    }

                    tokio::time::sleep(delay).await;

                    backoff = Duration::from_secs_f64(
                        (backoff.as_secs_f64() * self.multiplier)
                            .min(self.max_backoff.as_secs_f64()),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(
    unsafe_code,
    clippy::expect_used,
    clippy::significant_drop_tightening
)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn transient() -> ApiError {
        ApiError::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal Server Error".to_string(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_secs(1));
        assert_eq!(policy.max_backoff, Duration::from_secs(1));
        assert!((policy.multiplier - 1.0).abs() < f64::EPSILON);
        assert!(!policy.jitter);
    }

    #[test]
    fn test_from_env_custom_values() {
        unsafe {
            std::env::set_var("RIVALS_MAX_RETRIES", "5");
            std::env::set_var("RIVALS_RETRY_DELAY_MS", "200");
            std::env::set_var("RIVALS_RETRY_JITTER", "true");
        }

        let policy = RetryPolicy::from_env();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_backoff, Duration::from_millis(200));
        assert!(policy.jitter);

        unsafe {
            std::env::remove_var("RIVALS_MAX_RETRIES");
            std::env::remove_var("RIVALS_RETRY_DELAY_MS");
            std::env::remove_var("RIVALS_RETRY_JITTER");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_call_is_retried_three_times_one_second_apart() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();

        let result = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.lock().expect("Operation should succeed").push(start.elapsed());
                    Err::<(), ApiError>(transient())
                }
            })
            .await;

        assert!(matches!(result, Err(ApiError::Upstream { .. })));
        let calls = calls.lock().expect("Operation should succeed");
        assert_eq!(
            *calls,
            vec![
                Duration::ZERO,
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failures() {
        let policy = RetryPolicy::default();
        let count = Arc::new(Mutex::new(0));

        let result = policy
            .execute(|| {
                let count = Arc::clone(&count);
                async move {
                    let mut count = count.lock().expect("Operation should succeed");
                    *count += 1;
                    if *count < 3 { Err(transient()) } else { Ok(42) }
                }
            })
            .await;

        assert_eq!(result.expect("Operation should succeed"), 42);
        assert_eq!(*count.lock().expect("Operation should succeed"), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_immediately() {
        let policy = RetryPolicy::default();
        let count = Arc::new(Mutex::new(0));

        let result = policy
            .execute(|| {
                let count = Arc::clone(&count);
                async move {
                    *count.lock().expect("Operation should succeed") += 1;
                    Err::<(), ApiError>(ApiError::Config("bad".to_string()))
                }
            })
            .await;

        assert!(matches!(result, Err(ApiError::Config(_))));
        assert_eq!(*count.lock().expect("Operation should succeed"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_progression_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(50),
            multiplier: 2.0,
            jitter: false,
        };
        let start = Instant::now();

        let _ = policy
            .execute(|| async { Err::<(), ApiError>(transient()) })
            .await;

        // 10 + 20 + 40 + 50
        assert_eq!(start.elapsed(), Duration::from_millis(120));
    }
}
