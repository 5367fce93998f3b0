//! Fixed-window per-actor rate limiter

use super::types::{RateLimitConfig, RateLimitEntry, RateLimitScope};
use crate::tasks::Maintenance;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Fixed-window request counter keyed by actor.
///
/// Each actor's window opens on its first call after the previous window
/// lapsed (not wall-clock aligned) and admits `max_requests` calls. Calls
/// straddling a window boundary can therefore admit up to twice the limit in a
/// short span.
#[derive(Debug)]
pub struct RateLimiter {
    scope: RateLimitScope,
    config: RateLimitConfig,
    sweep_interval: Duration,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl RateLimiter {
    /// Create a rate limiter for a scope
    pub fn new(scope: RateLimitScope, config: RateLimitConfig) -> Self {
        Self {
            scope,
            config,
            sweep_interval: super::types::DEFAULT_SWEEP_INTERVAL,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Set the stale-entry sweep period
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn scope(&self) -> RateLimitScope {
        self.scope
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a call and report whether it is admitted. Never fails.
    pub fn is_allowed(&self, actor_id: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let fresh = RateLimitEntry {
            count: 0,
            reset_time: now + self.config.window,
        };
        let entry = entries.entry(actor_id.to_string()).or_insert(fresh);
        if entry.is_stale(now) {
            *entry = fresh;
        }
        if entry.count == 0 {
            trace!(actor_id, scope = %self.scope, "rate limit window opened");
        }

        if entry.count < self.config.max_requests {
            entry.count += 1;
            true
        } else {
            debug!(
                actor_id,
                scope = %self.scope,
                max_requests = self.config.max_requests,
                "rate limit exceeded"
            );
            false
        }
    }

    /// Calls the actor may still make in the current window
    pub fn remaining(&self, actor_id: &str) -> u32 {
        let now = Instant::now();
        match self.entries.lock().get(actor_id) {
            Some(entry) if !entry.is_stale(now) => {
                self.config.max_requests.saturating_sub(entry.count)
            }
            _ => self.config.max_requests,
        }
    }

    /// When the actor's current window lapses; `None` if there is no live window
    pub fn reset_time(&self, actor_id: &str) -> Option<Instant> {
        let now = Instant::now();
        self.entries
            .lock()
            .get(actor_id)
            .filter(|entry| !entry.is_stale(now))
            .map(|entry| entry.reset_time)
    }

    /// Time until the actor's window lapses; `None` if there is no live window
    pub fn retry_after(&self, actor_id: &str) -> Option<Duration> {
        self.reset_time(actor_id)
            .map(|reset| reset.saturating_duration_since(Instant::now()))
    }

    /// Forget one actor's window
    pub fn reset(&self, actor_id: &str) {
        self.entries.lock().remove(actor_id);
    }

    /// Forget every window
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries currently held, stale ones included
    pub fn tracked_actors(&self) -> usize {
        self.entries.lock().len()
    }

    /// Drop entries whose window lapsed; returns how many were removed
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_stale(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(scope = %self.scope, removed, "removed stale rate limit entries");
        }
        removed
    }
}

#[async_trait]
impl Maintenance for RateLimiter {
    fn task_name(&self) -> &'static str {
        match self.scope {
            RateLimitScope::Commands => "rate-limit-sweep-commands",
            RateLimitScope::Api => "rate-limit-sweep-api",
            RateLimitScope::Ai => "rate-limit-sweep-ai",
        }
    }

    fn maintenance_interval(&self) -> Duration {
        self.sweep_interval
    }

    async fn run_maintenance(&self) {
        self.cleanup();
    }
}
