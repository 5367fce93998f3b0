//! Telemetry and health monitoring

pub mod alerts;
pub mod health;
pub mod metrics;
pub mod probe;

pub use alerts::{Alert, AlertKind, AlertLog, Severity};
pub use health::{
    AlertSummary, HealthConfig, HealthMetrics, HealthMonitor, HealthState, HealthStatus,
};
pub use metrics::{Counter, LabeledCounter, SlidingWindowCounter};
pub use probe::{MemorySource, MemoryUsage, ProcessMemory, measure_event_loop_delay};
