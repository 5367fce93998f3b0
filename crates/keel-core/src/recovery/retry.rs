//! Retry policies for transient failures
//!
//! The loop is 0-indexed over `attempt in 0..=max_retries`: issue the
//! operation, return on success, stop on the last attempt or when the
//! predicate rejects the error, otherwise back off and go again. The backoff
//! wait is a tokio timer, so other tasks keep running while a call waits.

use super::backoff::{BackoffStrategy, ExponentialBackoff};
use crate::error::{KeelError, KeelResult, classify_error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Decides whether a failed attempt is worth repeating
pub type RetryPredicate = Arc<dyn Fn(&KeelError) -> bool + Send + Sync>;

/// Called before each backoff wait with the error and the 1-based retry number
pub type RetryHook = Arc<dyn Fn(&KeelError, u32) + Send + Sync>;

/// Serializable part of a retry policy
///
/// # Example
/// ```
/// use keel_core::recovery::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default()
///     .with_max_retries(5)
///     .with_base_delay(Duration::from_millis(200));
/// assert_eq!(config.max_delay, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts is `max_retries + 1`
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    /// Cap on any single delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// Add up to one second of random delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A config that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Create an ExponentialBackoff from this config
    pub fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.base_delay, self.max_delay).jitter(self.jitter)
    }
}

/// Retry on no-response failures and on 408, 429 and any 5xx
pub fn default_retry_predicate(error: &KeelError) -> bool {
    if error.is_no_response() {
        return true;
    }
    match error.status_code() {
        Some(408 | 429 | 503 | 504) => true,
        Some(status) => status >= 500,
        None => false,
    }
}

fn default_on_retry(error: &KeelError, attempt: u32) {
    debug!(attempt, error = %error, "retrying after failure");
}

/// Retry policy: limits, backoff and the two hooks
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    backoff: Arc<dyn BackoffStrategy>,
    retry_predicate: RetryPredicate,
    on_retry: RetryHook,
}

impl RetryPolicy {
    /// Create a policy with the default predicate and logging hook
    pub fn new(config: RetryConfig) -> Self {
        let backoff = Arc::new(config.create_backoff());
        Self {
            config,
            backoff,
            retry_predicate: Arc::new(default_retry_predicate),
            on_retry: Arc::new(default_on_retry),
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Set custom backoff strategy
    pub fn with_backoff<B: BackoffStrategy + 'static>(mut self, backoff: B) -> Self {
        self.backoff = Arc::new(backoff);
        self
    }

    pub fn with_retry_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&KeelError) -> bool + Send + Sync + 'static,
    {
        self.retry_predicate = Arc::new(predicate);
        self
    }

    /// Retry exactly when the classifier marks the error as retryable
    pub fn with_classified_predicate(self) -> Self {
        self.with_retry_predicate(|error| classify_error(error).should_retry)
    }

    pub fn with_on_retry<H>(mut self, hook: H) -> Self
    where
        H: Fn(&KeelError, u32) + Send + Sync + 'static,
    {
        self.on_retry = Arc::new(hook);
        self
    }

    /// Check if an error should be retried after the 0-indexed `attempt`
    pub fn should_retry(&self, error: &KeelError, attempt: u32) -> bool {
        attempt < self.config.max_retries && (self.retry_predicate)(error)
    }

    /// Delay before the attempt following `attempt`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay_for_attempt(attempt)
    }

    /// Execute an operation with retries
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> KeelResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = KeelResult<T>>,
    {
        let mut attempt = 0;
        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !self.should_retry(&error, attempt) {
                if attempt > 0 {
                    debug!(attempts = attempt + 1, error = %error, "giving up after retries");
                }
                return Err(error);
            }

            let delay = self.delay_for_attempt(attempt);
            attempt += 1;
            (self.on_retry)(&error, attempt);
            debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
            sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Retry any async fallible operation under `policy`
pub async fn retry_with_policy<T, F, Fut>(policy: &RetryPolicy, operation: F) -> KeelResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = KeelResult<T>>,
{
    policy.execute(operation).await
}
