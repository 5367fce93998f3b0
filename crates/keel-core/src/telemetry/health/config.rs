//! Health monitor thresholds

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Period of the health check
    #[serde(with = "humantime_serde")]
    pub check_interval: Duration,
    /// Alert log capacity
    pub max_alerts: usize,
    #[serde(with = "humantime_serde")]
    pub slow_command_threshold: Duration,
    #[serde(with = "humantime_serde")]
    pub slow_api_call_threshold: Duration,
    /// Memory ratio above which a `high` alert is raised
    pub memory_warning_ratio: f64,
    /// Memory ratio above which the alert is `critical`
    pub memory_critical_ratio: f64,
    /// Process memory budget; total system memory when unset
    pub memory_budget_bytes: Option<u64>,
    #[serde(with = "humantime_serde")]
    pub event_loop_warning: Duration,
    #[serde(with = "humantime_serde")]
    pub event_loop_critical: Duration,
    /// Hourly errors above which a `medium` alert is raised
    pub error_warning_count: usize,
    /// Hourly errors above which the alert is `high`
    pub error_critical_count: usize,
    /// Hourly API calls above which a `medium` alert is raised
    pub api_call_warning_count: usize,
    /// Window `status()` looks back over
    #[serde(with = "humantime_serde")]
    pub status_window: Duration,
    /// More recent alerts than this makes the status `warning`
    pub warning_alert_count: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            max_alerts: 100,
            slow_command_threshold: Duration::from_millis(5_000),
            slow_api_call_threshold: Duration::from_millis(10_000),
            memory_warning_ratio: 0.85,
            memory_critical_ratio: 0.95,
            memory_budget_bytes: None,
            event_loop_warning: Duration::from_millis(100),
            event_loop_critical: Duration::from_millis(500),
            error_warning_count: 50,
            error_critical_count: 100,
            api_call_warning_count: 1000,
            status_window: Duration::from_secs(5 * 60),
            warning_alert_count: 5,
        }
    }
}

impl HealthConfig {
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn with_max_alerts(mut self, max: usize) -> Self {
        self.max_alerts = max;
        self
    }

    pub fn with_memory_budget(mut self, bytes: u64) -> Self {
        self.memory_budget_bytes = Some(bytes);
        self
    }
}
