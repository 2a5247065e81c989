//! Opt-in backoff for rate-limited API calls.
//!
//! Only [`PlatformError::RateLimited`] is ever retried. Every other failure,
//! including network errors, surfaces immediately so the orchestrator can
//! record it against the snippet.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::platform::{PlatformError, short_error_message};

/// Initial backoff delay for rate-limited calls.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum backoff delay for rate-limited calls.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Backoff settings for rate-limited calls.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: usize,
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: 0,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Default delays with the given retry budget.
    #[must_use]
    pub fn with_max_retries(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Run `operation`, retrying it with exponential backoff while it fails with
/// [`PlatformError::RateLimited`].
///
/// `label` names the call in debug logs.
pub async fn with_rate_limit_retry<T, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    label: &str,
) -> Result<T, PlatformError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    if !config.is_enabled() {
        return operation().await;
    }

    let attempt = AtomicU32::new(0);
    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.clone().into_backoff())
        .notify(|err, dur| {
            tracing::debug!(
                "Rate limited on {}, retrying in {:?} (attempt {}): {}",
                label,
                dur,
                attempt.load(Ordering::SeqCst),
                short_error_message(err)
            );
        })
        .when(PlatformError::is_rate_limited)
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;

    fn rate_limited() -> PlatformError {
        PlatformError::RateLimited {
            reset_at: Utc::now(),
        }
    }

    #[test]
    fn default_config_does_not_retry() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 0);
        assert!(!config.is_enabled());
        assert_eq!(config.min_delay, Duration::from_millis(INITIAL_BACKOFF_MS));
        assert_eq!(config.max_delay, Duration::from_millis(MAX_BACKOFF_MS));
    }

    #[test]
    fn with_max_retries_keeps_default_delays() {
        let config = RetryConfig::with_max_retries(3).with_jitter(false);
        assert_eq!(config.max_retries, 3);
        assert!(config.is_enabled());
        assert!(!config.with_jitter);
    }

    #[tokio::test]
    async fn disabled_retry_calls_once_even_when_rate_limited() {
        let calls = Arc::new(AtomicU32::new(0));
        let capture = Arc::clone(&calls);

        let err = with_rate_limit_retry(
            move || {
                let capture = Arc::clone(&capture);
                async move {
                    capture.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(rate_limited())
                }
            },
            &RetryConfig::default(),
            "list",
        )
        .await
        .unwrap_err();

        assert!(err.is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_calls_are_retried_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let capture = Arc::clone(&calls);

        let result = with_rate_limit_retry(
            move || {
                let capture = Arc::clone(&capture);
                async move {
                    if capture.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(rate_limited())
                    } else {
                        Ok(7u32)
                    }
                }
            },
            &RetryConfig::with_max_retries(5),
            "create",
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_is_respected() {
        let calls = Arc::new(AtomicU32::new(0));
        let capture = Arc::clone(&calls);

        let err = with_rate_limit_retry(
            move || {
                let capture = Arc::clone(&capture);
                async move {
                    capture.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(rate_limited())
                }
            },
            &RetryConfig::with_max_retries(2),
            "delete",
        )
        .await
        .unwrap_err();

        assert!(err.is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let capture = Arc::clone(&calls);

        let err = with_rate_limit_retry(
            move || {
                let capture = Arc::clone(&capture);
                async move {
                    capture.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(PlatformError::network("connection reset"))
                }
            },
            &RetryConfig::with_max_retries(5),
            "get",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PlatformError::Network { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
