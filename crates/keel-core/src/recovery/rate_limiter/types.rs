//! Type definitions for rate limiting

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Default window length shared by every scope
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Default sweep period for stale entries (5 minutes)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Fixed-window limit for one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Calls admitted per actor per window
    pub max_requests: u32,
    /// Window length, measured from the first call after the previous window lapsed
    #[serde(default = "default_window", with = "humantime_serde")]
    pub window: Duration,
}

fn default_window() -> Duration {
    DEFAULT_WINDOW
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(30)
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// `max_requests` per 60 seconds
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, DEFAULT_WINDOW)
    }
}

/// Independent throttling scopes; actors never share entries across scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitScope {
    /// Bot commands
    Commands,
    /// Outbound calls to the tracker API
    Api,
    /// Calls to the AI backend
    Ai,
}

impl RateLimitScope {
    pub const ALL: [RateLimitScope; 3] = [Self::Commands, Self::Api, Self::Ai];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commands => "commands",
            Self::Api => "api",
            Self::Ai => "ai",
        }
    }
}

impl std::fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limits for all scopes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitsConfig {
    /// Period of the stale-entry sweep
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
    pub commands: RateLimitConfig,
    pub api: RateLimitConfig,
    pub ai: RateLimitConfig,
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            commands: RateLimitConfig::per_minute(15),
            api: RateLimitConfig::per_minute(30),
            ai: RateLimitConfig::per_minute(5),
        }
    }
}

impl RateLimitsConfig {
    pub fn for_scope(&self, scope: RateLimitScope) -> &RateLimitConfig {
        match scope {
            RateLimitScope::Commands => &self.commands,
            RateLimitScope::Api => &self.api,
            RateLimitScope::Ai => &self.ai,
        }
    }

    pub fn for_scope_mut(&mut self, scope: RateLimitScope) -> &mut RateLimitConfig {
        match scope {
            RateLimitScope::Commands => &mut self.commands,
            RateLimitScope::Api => &mut self.api,
            RateLimitScope::Ai => &mut self.ai,
        }
    }
}

/// Per-actor window state
#[derive(Debug, Clone, Copy)]
pub(crate) struct RateLimitEntry {
    pub count: u32,
    pub reset_time: Instant,
}

impl RateLimitEntry {
    pub fn is_stale(&self, now: Instant) -> bool {
        now > self.reset_time
    }
}
