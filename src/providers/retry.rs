/*!
 * Retry handling shared by the provider adapters.
 *
 * Transient failures (timeouts, connection errors, server errors) back off
 * linearly, rate limits back off exponentially. Terminal failures end the
 * call immediately. Either way the caller only sees `Option<T>`; the last
 * failure is kept in a `FailureRecord` for inspection.
 */

use std::future::Future;
use std::time::Duration;

use log::{error, warn};
use parking_lot::Mutex;

use crate::app_config::RetryConfig;
use crate::errors::ProviderError;

/// Attempt budget and base delay of a retried call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts (at least one is always made)
    pub max_retries: u32,
    /// Base delay between attempts
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Policy from the retry configuration section.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_delay_ms))
    }

    /// Policy without delays, for tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO)
    }

    /// Delay before the attempt following the failed zero-based `attempt`.
    pub fn delay_for(&self, error: &ProviderError, attempt: u32) -> Duration {
        if error.is_rate_limit() {
            self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
        } else {
            self.base_delay.saturating_mul(attempt + 1)
        }
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Last failure observed by an adapter.
#[derive(Debug, Default)]
pub struct FailureRecord {
    last: Mutex<Option<ProviderError>>,
}

impl FailureRecord {
    /// The most recent failure, if the last call failed.
    pub fn last(&self) -> Option<ProviderError> {
        self.last.lock().clone()
    }

    pub(crate) fn set(&self, error: Option<ProviderError>) {
        *self.last.lock() = error;
    }
}

/// Run `operation` under `policy`, returning `None` once attempts are exhausted
/// or a terminal failure occurs.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    failures: &FailureRecord,
    mut operation: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    failures.set(None);
    let attempts = policy.attempts();

    for attempt in 0..attempts {
        let error = match operation().await {
            Ok(value) => return Some(value),
            Err(e) => e,
        };

        if !error.is_retriable() {
            error!("{} failed: {}", label, error);
            failures.set(Some(error));
            return None;
        }

        warn!("{} failed (attempt {}/{}): {}", label, attempt + 1, attempts, error);
        let delay = policy.delay_for(&error, attempt);
        failures.set(Some(error));

        if attempt + 1 < attempts && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    error!("{} failed after {} attempt(s)", label, attempts);
    None
}
