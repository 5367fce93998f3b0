//! Environment variable overrides
//!
//! | Variable | Field |
//! |---|---|
//! | `KEEL_LOG_LEVEL` / `KEEL_LOG_FORMAT` | `logging.level` / `logging.format` |
//! | `KEEL_MAX_RETRIES` | `retry.max_retries` |
//! | `KEEL_RETRY_BASE_DELAY` / `KEEL_RETRY_MAX_DELAY` | `retry.*` (humantime, e.g. `500ms`) |
//! | `KEEL_MAX_CONTEXT_MESSAGES` / `KEEL_MAX_CONVERSATIONS` | `session.*` |
//! | `KEEL_CONVERSATION_TIMEOUT` | `session.conversation_timeout` |
//! | `KEEL_RATE_LIMIT_COMMANDS` / `_API` / `_AI` | per-scope `max_requests` |
//! | `KEEL_HEALTH_INTERVAL` | `health.check_interval` |
//! | `KEEL_BASE_URL` | `http.base_url` |

use super::model::KeelConfig;
use crate::error::{KeelError, KeelResult};
use crate::recovery::RateLimitScope;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Apply `KEEL_*` variables from the process environment
pub fn apply_env_overrides(config: &mut KeelConfig) -> KeelResult<()> {
    apply_overrides_from(config, |key| env::var(key).ok())
}

/// Apply overrides from any key lookup
pub fn apply_overrides_from<F>(config: &mut KeelConfig, lookup: F) -> KeelResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = lookup("KEEL_LOG_LEVEL") {
        config.logging.level = level.to_lowercase();
    }
    if let Some(format) = lookup("KEEL_LOG_FORMAT") {
        config.logging.format = format.to_lowercase();
    }
    if let Some(url) = lookup("KEEL_BASE_URL") {
        config.http.base_url = Some(url);
    }

    if let Some(value) = parse_var(&lookup, "KEEL_MAX_RETRIES")? {
        config.retry.max_retries = value;
    }
    if let Some(value) = parse_duration_var(&lookup, "KEEL_RETRY_BASE_DELAY")? {
        config.retry.base_delay = value;
    }
    if let Some(value) = parse_duration_var(&lookup, "KEEL_RETRY_MAX_DELAY")? {
        config.retry.max_delay = value;
    }

    if let Some(value) = parse_var(&lookup, "KEEL_MAX_CONTEXT_MESSAGES")? {
        config.session.max_context_messages = value;
    }
    if let Some(value) = parse_var(&lookup, "KEEL_MAX_CONVERSATIONS")? {
        config.session.max_conversations = value;
    }
    if let Some(value) = parse_duration_var(&lookup, "KEEL_CONVERSATION_TIMEOUT")? {
        config.session.conversation_timeout = value;
    }

    for scope in RateLimitScope::ALL {
        let key = format!("KEEL_RATE_LIMIT_{}", scope.as_str().to_uppercase());
        if let Some(value) = parse_var(&lookup, &key)? {
            config.rate_limits.for_scope_mut(scope).max_requests = value;
        }
    }

    if let Some(value) = parse_duration_var(&lookup, "KEEL_HEALTH_INTERVAL")? {
        config.health.check_interval = value;
    }

    Ok(())
}

fn parse_var<T, F>(lookup: &F, key: &str) -> KeelResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|_| {
        KeelError::config_with_context(
            format!("Invalid {} value", key),
            format!("Parsing '{}' from the environment", raw),
        )
    })
}

/// Humantime durations, or a bare integer meaning milliseconds
fn parse_duration_var<F>(lookup: &F, key: &str) -> KeelResult<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<u64>() {
        return Ok(Some(Duration::from_millis(millis)));
    }
    humantime_serde::re::humantime::parse_duration(raw)
        .map(Some)
        .map_err(|e| {
            KeelError::config_with_context(
                format!("Invalid {} value: {}", key, e),
                format!("Parsing '{}' from the environment", raw),
            )
        })
}
