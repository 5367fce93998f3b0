//! Configuration validation

use super::logging_config::{LOG_FORMATS, LOG_LEVELS};
use super::model::KeelConfig;
use crate::error::{KeelError, KeelResult};
use crate::recovery::RateLimitScope;
use std::time::Duration;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration
    pub fn validate(config: &KeelConfig) -> KeelResult<()> {
        Self::validate_session(config)?;
        Self::validate_rate_limits(config)?;
        Self::validate_retry(config)?;
        Self::validate_health(config)?;
        Self::validate_logging(config)?;
        Ok(())
    }

    fn validate_session(config: &KeelConfig) -> KeelResult<()> {
        let session = &config.session;
        if session.max_context_messages == 0 {
            return Err(KeelError::invalid_field(
                "session.max_context_messages",
                "must be at least 1",
            ));
        }
        if session.max_conversations == 0 {
            return Err(KeelError::invalid_field(
                "session.max_conversations",
                "must be at least 1",
            ));
        }
        non_zero("session.conversation_timeout", session.conversation_timeout)?;
        non_zero("session.cleanup_interval", session.cleanup_interval)
    }

    fn validate_rate_limits(config: &KeelConfig) -> KeelResult<()> {
        for scope in RateLimitScope::ALL {
            let limit = config.rate_limits.for_scope(scope);
            if limit.max_requests == 0 {
                return Err(KeelError::invalid_field(
                    format!("rate_limits.{}.max_requests", scope),
                    "must be at least 1",
                ));
            }
            non_zero(&format!("rate_limits.{}.window", scope), limit.window)?;
        }
        non_zero("rate_limits.sweep_interval", config.rate_limits.sweep_interval)
    }

    fn validate_retry(config: &KeelConfig) -> KeelResult<()> {
        let retry = &config.retry;
        if retry.base_delay > retry.max_delay {
            return Err(KeelError::invalid_field(
                "retry.base_delay",
                format!(
                    "base delay ({}ms) exceeds max delay ({}ms)",
                    retry.base_delay.as_millis(),
                    retry.max_delay.as_millis()
                ),
            ));
        }
        Ok(())
    }

    fn validate_health(config: &KeelConfig) -> KeelResult<()> {
        let health = &config.health;
        non_zero("health.check_interval", health.check_interval)?;
        non_zero("health.status_window", health.status_window)?;
        if health.max_alerts == 0 {
            return Err(KeelError::invalid_field("health.max_alerts", "must be at least 1"));
        }
        let ratios_ok = health.memory_warning_ratio > 0.0
            && health.memory_warning_ratio <= health.memory_critical_ratio;
        if !ratios_ok {
            return Err(KeelError::invalid_field(
                "health.memory_warning_ratio",
                "must be positive and not above memory_critical_ratio",
            ));
        }
        if health.event_loop_warning > health.event_loop_critical {
            return Err(KeelError::invalid_field(
                "health.event_loop_warning",
                "must not exceed event_loop_critical",
            ));
        }
        if health.error_warning_count > health.error_critical_count {
            return Err(KeelError::invalid_field(
                "health.error_warning_count",
                "must not exceed error_critical_count",
            ));
        }
        Ok(())
    }

    fn validate_logging(config: &KeelConfig) -> KeelResult<()> {
        let logging = &config.logging;
        if !LOG_LEVELS.contains(&logging.level.as_str()) {
            return Err(KeelError::invalid_field(
                "logging.level",
                format!("'{}' is not one of {:?}", logging.level, LOG_LEVELS),
            ));
        }
        if !LOG_FORMATS.contains(&logging.format.as_str()) {
            return Err(KeelError::invalid_field(
                "logging.format",
                format!("'{}' is not one of {:?}", logging.format, LOG_FORMATS),
            ));
        }
        Ok(())
    }
}

fn non_zero(field: &str, value: Duration) -> KeelResult<()> {
    if value.is_zero() {
        Err(KeelError::invalid_field(field, "must be greater than zero"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(config: &KeelConfig) -> Option<String> {
        match ConfigValidator::validate(config) {
            Err(KeelError::InvalidInput { field, .. }) => field,
            _ => None,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(KeelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_capacities() {
        let mut config = KeelConfig::default();
        config.session.max_conversations = 0;
        assert_eq!(field_of(&config).as_deref(), Some("session.max_conversations"));

        let mut config = KeelConfig::default();
        config.rate_limits.api.max_requests = 0;
        assert_eq!(field_of(&config).as_deref(), Some("rate_limits.api.max_requests"));
    }

    #[test]
    fn test_rejects_zero_window() {
        let mut config = KeelConfig::default();
        config.rate_limits.ai.window = Duration::ZERO;
        assert_eq!(field_of(&config).as_deref(), Some("rate_limits.ai.window"));
    }

    #[test]
    fn test_rejects_inverted_delays() {
        let mut config = KeelConfig::default();
        config.retry.base_delay = Duration::from_secs(20);
        assert_eq!(field_of(&config).as_deref(), Some("retry.base_delay"));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let mut config = KeelConfig::default();
        config.logging.format = "xml".into();
        assert_eq!(field_of(&config).as_deref(), Some("logging.format"));
    }

    #[test]
    fn test_rejects_inverted_memory_ratios() {
        let mut config = KeelConfig::default();
        config.health.memory_warning_ratio = 0.99;
        assert_eq!(
            field_of(&config).as_deref(),
            Some("health.memory_warning_ratio")
        );
    }
}
