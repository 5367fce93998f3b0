//! File-based configuration loading

use super::model::KeelConfig;
use crate::error::{KeelError, KeelResult};
use std::fs;
use std::path::Path;

/// Load configuration from a file
///
/// Supports JSON, TOML, and YAML formats based on file extension.
/// Returns default config if file doesn't exist.
pub fn load_from_file(path: &Path) -> KeelResult<KeelConfig> {
    if !path.exists() {
        return Ok(KeelConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        KeelError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let config: KeelConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            KeelError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                format!("Deserializing TOML configuration from '{}'", path.display()),
            )
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            KeelError::config_with_context(
                format!("Failed to parse YAML config: {}", e),
                format!("Deserializing YAML configuration from '{}'", path.display()),
            )
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            KeelError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
    };

    Ok(config)
}

/// Write configuration as TOML, creating parent directories
pub fn save_to_file(config: &KeelConfig, path: &Path) -> KeelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            KeelError::config_with_context(
                format!("Failed to create config directory: {}", e),
                format!("Creating '{}'", parent.display()),
            )
        })?;
    }
    fs::write(path, config.to_toml_string()?).map_err(|e| {
        KeelError::config_with_context(
            format!("Failed to write config file: {}", e),
            format!("Writing configuration to '{}'", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::RateLimitScope;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_from_file(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.session.max_context_messages, 10);
        assert_eq!(config.rate_limits.commands.max_requests, 15);
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("keel.toml");
        fs::write(
            &config_path,
            r#"
[session]
max_context_messages = 20
conversation_timeout = "45m"

[rate_limits.ai]
max_requests = 2
window = "30s"

[retry]
max_retries = 5
base_delay = "500ms"

[health]
check_interval = "10s"
"#,
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.session.max_context_messages, 20);
        assert_eq!(config.session.conversation_timeout, Duration::from_secs(45 * 60));
        assert_eq!(config.session.max_conversations, 1000);
        let ai = config.rate_limits.for_scope(RateLimitScope::Ai);
        assert_eq!(ai.max_requests, 2);
        assert_eq!(ai.window, Duration::from_secs(30));
        assert_eq!(config.rate_limits.api.max_requests, 30);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(500));
        assert_eq!(config.retry.max_delay, Duration::from_secs(10));
        assert_eq!(config.health.check_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("keel.yaml");
        fs::write(
            &config_path,
            "http:\n  base_url: https://tracker.test/api\n  request_timeout: 5s\nlogging:\n  level: debug\n",
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.http.base_url.as_deref(), Some("https://tracker.test/api"));
        assert_eq!(config.http.request_timeout, Duration::from_secs(5));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("keel.json");
        fs::write(
            &config_path,
            r#"{"health": {"max_alerts": 20, "memory_warning_ratio": 0.7}}"#,
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.health.max_alerts, 20);
        assert_eq!(config.health.memory_warning_ratio, 0.7);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[session\nmax = ").unwrap();

        let err = load_from_file(&config_path).unwrap_err();
        assert_eq!(err.error_code(), "KEEL_CONFIG");
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("keel.toml");
        let mut config = KeelConfig::default();
        config.session.max_conversations = 250;
        config.http.headers.insert("x-api-key".into(), "k".into());

        save_to_file(&config, &config_path).unwrap();
        let loaded = load_from_file(&config_path).unwrap();

        assert_eq!(loaded.session.max_conversations, 250);
        assert_eq!(loaded.http.headers.get("x-api-key").map(String::as_str), Some("k"));
        assert_eq!(loaded.rate_limits, config.rate_limits);
        assert_eq!(loaded.retry, config.retry);
    }
}
