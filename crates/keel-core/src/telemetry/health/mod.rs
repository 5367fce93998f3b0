//! Health monitoring
//!
//! Commands, upstream calls, errors and rate-limit rejections are fed in by
//! the dispatcher and the HTTP client. A periodic check samples process memory
//! and scheduler latency and raises alerts into a bounded log.

mod config;
mod monitor;
mod report;
mod types;


pub use config::HealthConfig;
pub use monitor::HealthMonitor;
pub use types::{AlertSummary, HealthMetrics, HealthState, HealthStatus};
