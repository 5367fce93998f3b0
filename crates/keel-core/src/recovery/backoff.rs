//! Backoff strategies for retry operations

use rand::Rng;
use std::time::Duration;

/// Upper bound of the random addition applied to every delay
pub const MAX_JITTER: Duration = Duration::from_millis(1000);

/// Backoff strategy trait
pub trait BackoffStrategy: Send + Sync {
    /// Get the delay for the given attempt number (0-indexed)
    fn delay_for_attempt(&self, attempt: u32) -> Duration;
}

/// Exponential backoff: `min(base * 2^attempt + jitter, max_delay)`
/// where jitter is uniform in `[0, 1000ms]`
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl ExponentialBackoff {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
            jitter: true,
        }
    }

    /// Enable or disable jitter
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Deterministic part of the delay, before jitter and cap
    pub fn base_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    fn add_jitter(&self, delay: Duration) -> Duration {
        if !self.jitter {
            return delay;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=MAX_JITTER.as_millis() as u64);
        delay.saturating_add(Duration::from_millis(jitter_ms))
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.add_jitter(self.base_for_attempt(attempt))
            .min(self.max_delay)
    }
}

/// Constant backoff, same delay for all attempts
#[derive(Debug, Clone)]
pub struct ConstantBackoff {
    delay: Duration,
}

impl ConstantBackoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl BackoffStrategy for ConstantBackoff {
    fn delay_for_attempt(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delays_stay_in_bounds() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(60));

        for attempt in 0..6 {
            let floor = Duration::from_millis(100 * 2u64.pow(attempt));
            for _ in 0..50 {
                let delay = backoff.delay_for_attempt(attempt);
                assert!(delay >= floor, "attempt {attempt}: {delay:?} < {floor:?}");
                assert!(delay <= floor + MAX_JITTER);
            }
        }
    }

    #[test]
    fn test_exponential_never_exceeds_max() {
        let backoff = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10));

        for attempt in 0..40 {
            assert!(backoff.delay_for_attempt(attempt) <= Duration::from_secs(10));
        }
        assert_eq!(backoff.delay_for_attempt(4), Duration::from_secs(10));
    }

    #[test]
    fn test_without_jitter() {
        let backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10)).jitter(false);

        assert_eq!(backoff.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_secs(8));
        assert_eq!(backoff.delay_for_attempt(4), Duration::from_secs(10));
    }

    #[test]
    fn test_constant_backoff() {
        let backoff = ConstantBackoff::new(Duration::from_millis(250));
        assert_eq!(backoff.delay_for_attempt(0), Duration::from_millis(250));
        assert_eq!(backoff.delay_for_attempt(9), Duration::from_millis(250));
    }
}
