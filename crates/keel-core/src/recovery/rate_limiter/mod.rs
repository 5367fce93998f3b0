//! Per-actor request throttling
//!
//! Fixed-window counters, one independent instance per scope (commands, API
//! calls, AI calls). Stale entries are harmless for correctness and are only
//! swept to bound memory.

mod limiter;
mod registry;
mod types;

#[cfg(test)]
mod tests;

pub use limiter::RateLimiter;
pub use registry::RateLimiters;
pub use types::{
    DEFAULT_SWEEP_INTERVAL, DEFAULT_WINDOW, RateLimitConfig, RateLimitScope, RateLimitsConfig,
};
