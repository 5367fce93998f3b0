//! Health monitor

use super::config::HealthConfig;
use super::types::{AlertSummary, HealthMetrics, HealthState, HealthStatus};
use crate::recovery::RateLimitScope;
use crate::session::SessionCache;
use crate::tasks::Maintenance;
use crate::telemetry::alerts::{Alert, AlertKind, AlertLog, Severity};
use crate::telemetry::metrics::{Counter, LabeledCounter, SlidingWindowCounter};
use crate::telemetry::probe::{MemorySource, MemoryUsage, ProcessMemory, measure_event_loop_delay};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default)]
struct ProbeSample {
    memory: MemoryUsage,
    event_loop_delay: Duration,
    checked_at: Option<DateTime<Utc>>,
}

/// Aggregates command, API, error and rate-limit events into windowed
/// counters and raises alerts when thresholds are crossed.
///
/// Event recording is synchronous and cheap. The periodic check samples
/// memory and scheduler latency, then evaluates every threshold.
pub struct HealthMonitor {
    config: HealthConfig,
    started_at: Instant,
    commands: Counter,
    rate_limit_hits: Counter,
    errors: SlidingWindowCounter,
    api_calls: SlidingWindowCounter,
    errors_by_kind: LabeledCounter,
    alerts: Mutex<AlertLog>,
    sample: Mutex<ProbeSample>,
    memory_source: Arc<dyn MemorySource>,
    sessions: Option<Arc<SessionCache>>,
}

impl HealthMonitor {
    pub fn new(config: HealthConfig) -> Self {
        let memory_source = Arc::new(ProcessMemory::new(config.memory_budget_bytes));
        Self {
            alerts: Mutex::new(AlertLog::new(config.max_alerts)),
            config,
            started_at: Instant::now(),
            commands: Counter::new("commands_processed"),
            rate_limit_hits: Counter::new("rate_limit_hits"),
            errors: SlidingWindowCounter::hourly(),
            api_calls: SlidingWindowCounter::hourly(),
            errors_by_kind: LabeledCounter::new(),
            sample: Mutex::new(ProbeSample::default()),
            memory_source,
            sessions: None,
        }
    }

    /// Read session counts from this cache on every snapshot
    pub fn with_session_cache(mut self, sessions: Arc<SessionCache>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_memory_source(mut self, source: Arc<dyn MemorySource>) -> Self {
        self.memory_source = source;
        self
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Count a finished command; failures also count as errors
    pub fn record_command(&self, name: &str, success: bool, duration: Duration) {
        self.commands.inc();
        if !success {
            self.record_error("command", format_args!("command '{}' failed", name));
        }
        if duration > self.config.slow_command_threshold {
            self.raise(
                AlertKind::Performance {
                    operation: format!("command:{}", name),
                    duration,
                    threshold: self.config.slow_command_threshold,
                },
                Severity::Medium,
                format!("Slow command '{}' took {}ms", name, duration.as_millis()),
            );
        }
    }

    /// Count one upstream response; status >= 400 also counts as an error
    pub fn record_api_call(&self, method: &str, url: &str, status: u16, duration: Duration) {
        self.api_calls.record();
        if status >= 400 {
            self.record_error("api", format_args!("{} {} returned {}", method, url, status));
        }
        if duration > self.config.slow_api_call_threshold {
            self.raise(
                AlertKind::Performance {
                    operation: format!("{} {}", method, url),
                    duration,
                    threshold: self.config.slow_api_call_threshold,
                },
                Severity::Medium,
                format!(
                    "Slow API call {} {} took {}ms",
                    method,
                    url,
                    duration.as_millis()
                ),
            );
        }
    }

    /// Count an error of any kind toward the hourly error rate
    pub fn record_error(&self, kind: &str, error: impl fmt::Display) {
        let count = self.errors.record();
        self.errors_by_kind.inc(kind);
        warn!(kind, errors_last_hour = count, "{}", error);
    }

    pub fn record_rate_limit_hit(&self, actor_id: &str, scope: RateLimitScope) {
        self.rate_limit_hits.inc();
        self.raise(
            AlertKind::RateLimits {
                actor_id: actor_id.to_string(),
                scope,
            },
            Severity::Low,
            format!("Actor {} hit the {} rate limit", actor_id, scope),
        );
    }

    /// Sample the process, then evaluate every threshold
    pub async fn run_health_check(&self) -> HealthMetrics {
        let event_loop_delay = measure_event_loop_delay().await;
        let memory = self.memory_source.sample();
        *self.sample.lock() = ProbeSample {
            memory,
            event_loop_delay,
            checked_at: Some(Utc::now()),
        };

        let metrics = self.snapshot();
        let raised = self.evaluate_thresholds(&metrics);
        debug!(
            memory_ratio = metrics.memory.ratio(),
            event_loop_delay_ms = event_loop_delay.as_millis() as u64,
            errors_last_hour = metrics.errors_last_hour,
            api_calls_last_hour = metrics.api_calls_last_hour,
            active_sessions = metrics.active_sessions,
            alerts_raised = raised,
            "health check completed"
        );
        metrics
    }

    /// Raise alerts for every threshold `metrics` crosses; returns how many
    pub fn evaluate_thresholds(&self, metrics: &HealthMetrics) -> usize {
        let config = &self.config;
        let mut raised = 0;

        let ratio = metrics.memory.ratio();
        if ratio > config.memory_warning_ratio {
            let severity = if ratio > config.memory_critical_ratio {
                Severity::Critical
            } else {
                Severity::High
            };
            self.raise(
                AlertKind::Memory {
                    usage_ratio: ratio,
                    used_bytes: metrics.memory.used_bytes,
                    budget_bytes: metrics.memory.budget_bytes,
                },
                severity,
                format!("High memory usage: {:.1}%", ratio * 100.0),
            );
            raised += 1;
        }

        let delay = metrics.event_loop_delay;
        if delay > config.event_loop_warning {
            let severity = if delay > config.event_loop_critical {
                Severity::High
            } else {
                Severity::Medium
            };
            self.raise(
                AlertKind::EventLoop { delay },
                severity,
                format!("Event loop delay: {}ms", delay.as_millis()),
            );
            raised += 1;
        }

        let errors = metrics.errors_last_hour;
        if errors > config.error_warning_count {
            let severity = if errors > config.error_critical_count {
                Severity::High
            } else {
                Severity::Medium
            };
            self.raise(
                AlertKind::Errors {
                    count_last_hour: errors,
                },
                severity,
                format!("High error rate: {} errors in the last hour", errors),
            );
            raised += 1;
        }

        let calls = metrics.api_calls_last_hour;
        if calls > config.api_call_warning_count {
            self.raise(
                AlertKind::Api {
                    calls_last_hour: calls,
                },
                Severity::Medium,
                format!("High API usage: {} calls in the last hour", calls),
            );
            raised += 1;
        }

        raised
    }

    /// Current metrics; counters are live, memory and delay come from the
    /// latest health check. Never touches session activity.
    pub fn snapshot(&self) -> HealthMetrics {
        let sample = *self.sample.lock();
        let sessions = self.sessions.as_ref().map(|cache| cache.stats());
        HealthMetrics {
            uptime: self.started_at.elapsed(),
            memory: sample.memory,
            event_loop_delay: sample.event_loop_delay,
            active_sessions: sessions.as_ref().map_or(0, |s| s.total_sessions),
            sessions,
            commands_processed: self.commands.get(),
            errors_last_hour: self.errors.count(),
            api_calls_last_hour: self.api_calls.count(),
            rate_limit_hits: self.rate_limit_hits.get(),
            errors_by_kind: self.errors_by_kind.get_all(),
            last_check: sample.checked_at,
        }
    }

    pub fn status(&self) -> HealthStatus {
        let alerts = self.recent_alerts(self.config.status_window);
        let summary = AlertSummary::from_alerts(&alerts);
        let status = if summary.critical > 0 {
            HealthState::Critical
        } else if summary.high > 0 || summary.total > self.config.warning_alert_count {
            HealthState::Warning
        } else {
            HealthState::Healthy
        };

        HealthStatus {
            status,
            metrics: self.snapshot(),
            alerts,
            summary,
        }
    }

    /// Alerts raised within `window`, oldest first
    pub fn recent_alerts(&self, window: Duration) -> Vec<Alert> {
        self.alerts.lock().recent(window)
    }

    /// Every retained alert, oldest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().all()
    }

    /// Drop all counters, windows and alerts
    pub fn clear(&self) {
        self.commands.reset();
        self.rate_limit_hits.reset();
        self.errors.clear();
        self.api_calls.clear();
        self.errors_by_kind.reset();
        self.alerts.lock().clear();
    }

    fn raise(&self, kind: AlertKind, severity: Severity, message: String) {
        let alert_type = kind.name();
        match severity {
            Severity::Critical => error!(alert_type, %severity, "{}", message),
            Severity::High => warn!(alert_type, %severity, "{}", message),
            Severity::Medium => info!(alert_type, %severity, "{}", message),
            Severity::Low => debug!(alert_type, %severity, "{}", message),
        }
        self.alerts
            .lock()
            .push(Alert::new(kind, severity, message));
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}

impl fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("config", &self.config)
            .field("commands", &self.commands.get())
            .field("alerts", &self.alerts.lock().len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Maintenance for HealthMonitor {
    fn task_name(&self) -> &'static str {
        "health-check"
    }

    fn maintenance_interval(&self) -> Duration {
        self.config.check_interval
    }

    async fn run_maintenance(&self) {
        self.run_health_check().await;
    }
}
