//! Snapshot and status types

use crate::session::SessionCacheStats;
use crate::telemetry::alerts::{Alert, Severity};
use crate::telemetry::probe::MemoryUsage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Point-in-time health metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthMetrics {
    #[serde(with = "humantime_serde")]
    pub uptime: Duration,
    /// From the latest health check
    pub memory: MemoryUsage,
    /// From the latest health check
    #[serde(with = "humantime_serde")]
    pub event_loop_delay: Duration,
    pub active_sessions: usize,
    pub sessions: Option<SessionCacheStats>,
    /// Lifetime
    pub commands_processed: u64,
    pub errors_last_hour: usize,
    pub api_calls_last_hour: usize,
    /// Lifetime
    pub rate_limit_hits: u64,
    pub errors_by_kind: Vec<(String, u64)>,
    pub last_check: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Warning,
    Critical,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recent alert counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        alerts.iter().fold(Self::default(), |mut summary, alert| {
            summary.total += 1;
            match alert.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
            summary
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub metrics: HealthMetrics,
    /// Alerts inside the status window
    pub alerts: Vec<Alert>,
    pub summary: AlertSummary,
}
