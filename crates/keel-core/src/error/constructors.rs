//! Constructor methods for KeelError

use super::types::KeelError;
use std::time::Duration;

impl KeelError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a network (no response) error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            url: None,
        }
    }

    /// Create a network error for a specific URL
    pub fn network_with_url(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            url: Some(url.into()),
        }
    }

    /// Create an HTTP status error
    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            url: None,
            status_code,
            retry_after: None,
            body: None,
        }
    }

    /// Attach the request URL to a failure
    pub fn with_url(mut self, request_url: impl Into<String>) -> Self {
        match &mut self {
            Self::Network { url, .. } | Self::Http { url, .. } | Self::Timeout { url, .. } => {
                *url = Some(request_url.into());
            }
            _ => {}
        }
        self
    }

    /// Attach a raw `Retry-After` header value to an HTTP error
    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        if let Self::Http { retry_after, .. } = &mut self {
            *retry_after = Some(value.into());
        }
        self
    }

    /// Attach the response body to an HTTP error
    pub fn with_body(mut self, value: impl Into<String>) -> Self {
        if let Self::Http { body, .. } = &mut self {
            *body = Some(value.into());
        }
        self
    }

    /// Create a timeout error
    pub fn timeout(elapsed: Duration) -> Self {
        Self::Timeout { elapsed, url: None }
    }

    /// Create a new JSON error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: None,
        }
    }

    /// Create an invalid input error naming the offending field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            context: None,
        }
    }
}
