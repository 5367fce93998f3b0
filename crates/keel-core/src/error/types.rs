//! Core error types for keel

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for keel operations
pub type KeelResult<T> = Result<T, KeelError>;

/// Main error type for keel
///
/// `Network` and `Timeout` describe failures where no response was received.
/// `Http` always carries a response status of 400 or above.
#[derive(Error, Debug, Clone)]
pub enum KeelError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// The request never produced a response (DNS, refused, reset, ...)
    #[error("Network error: {message}")]
    Network {
        message: String,
        url: Option<String>,
    },

    /// Upstream answered with an error status
    #[error("HTTP {status_code}: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: u16,
        /// Raw `Retry-After` header value, if the response carried one
        retry_after: Option<String>,
        body: Option<String>,
    },

    /// Client-side timeout while waiting for a response
    #[error("Request timed out after {}ms", elapsed.as_millis())]
    Timeout {
        elapsed: Duration,
        url: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}

impl KeelError {
    /// Whether the failure happened before any response arrived
    pub fn is_no_response(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// The HTTP status of the failed response, if there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// The URL involved in the failure, if known
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Network { url, .. } | Self::Http { url, .. } | Self::Timeout { url, .. } => {
                url.as_deref()
            }
            _ => None,
        }
    }

    /// Stable short code used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "KEEL_CONFIG",
            Self::Network { .. } => "KEEL_NETWORK",
            Self::Http { .. } => "KEEL_HTTP",
            Self::Timeout { .. } => "KEEL_TIMEOUT",
            Self::Json { .. } => "KEEL_JSON",
            Self::InvalidInput { .. } => "KEEL_INVALID_INPUT",
            Self::Other { .. } => "KEEL_OTHER",
        }
    }
}

impl From<serde_json::Error> for KeelError {
    fn from(err: serde_json::Error) -> Self {
        Self::json(err.to_string())
    }
}

/// Stable failure taxonomy shared by every caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    Network,
    Client,
    Server,
    Timeout,
    Auth,
    NotFound,
    RateLimit,
    Unknown,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Client => "client",
            Self::Server => "server",
            Self::Timeout => "timeout",
            Self::Auth => "auth",
            Self::NotFound => "notFound",
            Self::RateLimit => "rateLimit",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`classify_error`](super::classify_error)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorClassification {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    /// Text that is safe to show to an end user
    pub user_message: String,
    pub should_retry: bool,
    /// Only set for rate-limit responses
    #[serde(with = "humantime_serde")]
    pub retry_after: Option<Duration>,
}
