//! One limiter per scope

use super::limiter::RateLimiter;
use super::types::{RateLimitScope, RateLimitsConfig};
use std::sync::Arc;

/// The command, API and AI limiters, built from one config
#[derive(Debug, Clone)]
pub struct RateLimiters {
    commands: Arc<RateLimiter>,
    api: Arc<RateLimiter>,
    ai: Arc<RateLimiter>,
}

impl RateLimiters {
    pub fn new(config: &RateLimitsConfig) -> Self {
        let build = |scope: RateLimitScope| {
            Arc::new(
                RateLimiter::new(scope, config.for_scope(scope).clone())
                    .with_sweep_interval(config.sweep_interval),
            )
        };
        Self {
            commands: build(RateLimitScope::Commands),
            api: build(RateLimitScope::Api),
            ai: build(RateLimitScope::Ai),
        }
    }

    pub fn get(&self, scope: RateLimitScope) -> &Arc<RateLimiter> {
        match scope {
            RateLimitScope::Commands => &self.commands,
            RateLimitScope::Api => &self.api,
            RateLimitScope::Ai => &self.ai,
        }
    }

    pub fn commands(&self) -> &Arc<RateLimiter> {
        &self.commands
    }

    pub fn api(&self) -> &Arc<RateLimiter> {
        &self.api
    }

    pub fn ai(&self) -> &Arc<RateLimiter> {
        &self.ai
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RateLimiter>> {
        [&self.commands, &self.api, &self.ai].into_iter()
    }

    /// Sweep stale entries in every scope
    pub fn cleanup(&self) -> usize {
        self.iter().map(|limiter| limiter.cleanup()).sum()
    }

    /// Forget every window in every scope
    pub fn clear(&self) {
        self.iter().for_each(|limiter| limiter.clear());
    }
}

impl Default for RateLimiters {
    fn default() -> Self {
        Self::new(&RateLimitsConfig::default())
    }
}
