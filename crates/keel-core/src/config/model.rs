//! Top-level configuration

use super::logging_config::LoggingConfig;
use crate::error::{KeelError, KeelResult};
use crate::http::HttpConfig;
use crate::recovery::{RateLimitsConfig, RetryConfig};
use crate::session::SessionCacheConfig;
use crate::telemetry::HealthConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to build a `ResilienceLayer`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeelConfig {
    pub session: SessionCacheConfig,
    pub rate_limits: RateLimitsConfig,
    pub retry: RetryConfig,
    pub health: HealthConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

impl KeelConfig {
    /// File (if present), then `KEEL_*` environment overrides, then validation
    pub fn load(path: Option<&Path>) -> KeelResult<Self> {
        let mut config = match path {
            Some(path) => super::file_loader::load_from_file(path)?,
            None => Self::default(),
        };
        super::env_loader::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> KeelResult<()> {
        super::validation::ConfigValidator::validate(self)
    }

    pub fn to_toml_string(&self) -> KeelResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            KeelError::config_with_context(
                format!("Failed to serialize config: {}", e),
                "Rendering configuration as TOML",
            )
        })
    }

    pub fn to_json_string(&self) -> KeelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
