//! Keel Core Library
//!
//! Operational resilience for long-running chat bot services: bounded
//! conversation memory, per-actor rate limiting, retrying outbound HTTP,
//! error classification and health monitoring.

pub mod config;
pub mod error;
pub mod http;
pub mod layer;
pub mod recovery;
pub mod session;
pub mod tasks;
pub mod telemetry;

// Re-export commonly used types
pub use config::{KeelConfig, LoggingConfig};
pub use error::{ErrorClassification, ErrorHandler, ErrorType, KeelError, KeelResult, classify_error};
pub use http::{HttpConfig, HttpRequest, HttpResponse, HttpTransport, RetryingClient};
pub use layer::{CommandFailure, ResilienceLayer};
pub use recovery::{
    RateLimitConfig, RateLimitScope, RateLimiter, RateLimiters, RetryConfig, RetryPolicy,
};
pub use session::{ChatMessage, Role, SessionCache, SessionCacheConfig};
pub use tasks::{Maintenance, PeriodicTask};
pub use telemetry::{Alert, AlertKind, HealthConfig, HealthMonitor, HealthStatus, Severity};
