//! Alerts and the bounded alert log

use crate::recovery::RateLimitScope;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an alert is about, with only the fields relevant to that kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AlertKind {
    Memory {
        usage_ratio: f64,
        used_bytes: u64,
        budget_bytes: u64,
    },
    EventLoop {
        #[serde(with = "humantime_serde")]
        delay: Duration,
    },
    Errors {
        count_last_hour: usize,
    },
    RateLimits {
        actor_id: String,
        scope: RateLimitScope,
    },
    Api {
        calls_last_hour: usize,
    },
    /// A command or upstream call that took longer than its threshold
    Performance {
        operation: String,
        #[serde(with = "humantime_serde")]
        duration: Duration,
        #[serde(with = "humantime_serde")]
        threshold: Duration,
    },
}

impl AlertKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::EventLoop { .. } => "eventLoop",
            Self::Errors { .. } => "errors",
            Self::RateLimits { .. } => "rateLimits",
            Self::Api { .. } => "api",
            Self::Performance { .. } => "performance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    #[serde(flatten)]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) raised_at: Instant,
}

impl Alert {
    pub fn new(kind: AlertKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            timestamp: Utc::now(),
            raised_at: Instant::now(),
        }
    }

    /// Time since the alert was raised
    pub fn age(&self) -> Duration {
        self.raised_at.elapsed()
    }
}

/// Ring buffer of alerts; the oldest entry is dropped once full
#[derive(Debug)]
pub struct AlertLog {
    capacity: usize,
    alerts: VecDeque<Alert>,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            alerts: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn push(&mut self, alert: Alert) {
        if self.capacity == 0 {
            return;
        }
        while self.alerts.len() >= self.capacity {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert);
    }

    /// Alerts raised strictly within `window`, oldest first
    pub fn recent(&self, window: Duration) -> Vec<Alert> {
        self.alerts
            .iter()
            .filter(|alert| alert.age() < window)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}
