//! Recovery primitives
//!
//! - Per-actor rate limiting across independent scopes
//! - Exponential backoff with jitter
//! - Retry policies with pluggable predicate and hook

pub mod backoff;
pub mod rate_limiter;
pub mod retry;

pub use backoff::{BackoffStrategy, ConstantBackoff, ExponentialBackoff};
pub use rate_limiter::{RateLimitConfig, RateLimitScope, RateLimiter, RateLimiters, RateLimitsConfig};
pub use retry::{
    RetryConfig, RetryHook, RetryPolicy, RetryPredicate, default_retry_predicate,
    retry_with_policy,
};
