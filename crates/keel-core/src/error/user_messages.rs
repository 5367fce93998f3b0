//! User-facing error surfacing
//!
//! Raw errors (and whatever upstream put in them) are only ever logged. Callers
//! that reply to an end user get the classified message instead.

use super::classifiers::classify_error;
use super::types::{ErrorClassification, ErrorType, KeelError};

/// Logs failures and returns text that is safe to show to end users
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    pub fn new() -> Self {
        Self
    }

    /// Log `error` with `context` and return its classification
    pub fn handle(&self, error: &KeelError, context: &str) -> ErrorClassification {
        let classification = classify_error(error);

        match classification.error_type {
            ErrorType::Server | ErrorType::Unknown => tracing::error!(
                context,
                error_code = error.error_code(),
                error_type = %classification.error_type,
                error = %error,
                "operation failed"
            ),
            ErrorType::Network | ErrorType::Timeout | ErrorType::RateLimit => tracing::warn!(
                context,
                error_code = error.error_code(),
                error_type = %classification.error_type,
                error = %error,
                "operation failed"
            ),
            ErrorType::Auth | ErrorType::NotFound | ErrorType::Client => tracing::info!(
                context,
                error_code = error.error_code(),
                error_type = %classification.error_type,
                error = %error,
                "operation rejected upstream"
            ),
        }

        classification
    }

    /// Log `error` and return only the user-facing message
    pub fn user_message(&self, error: &KeelError, context: &str) -> String {
        self.handle(error, context).user_message
    }
}
