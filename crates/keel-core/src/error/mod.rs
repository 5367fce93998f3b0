//! Error types for keel
//!
//! This module provides the crate-wide error enum and the pure classifier that
//! maps any failure onto a stable taxonomy:
//! - `KeelError`: every fallible operation in the crate returns it
//! - `classify_error`: turns a `KeelError` into an `ErrorClassification`
//!   (type, user-facing text, retry hint)
//! - `ErrorHandler`: logs raw failures and hands back only the user message

mod classifiers;
mod constructors;
mod types;
mod user_messages;

#[cfg(test)]
mod tests;

pub use classifiers::{DEFAULT_RATE_LIMIT_WAIT, classify_error, parse_retry_after};
pub use types::{ErrorClassification, ErrorType, KeelError, KeelResult};
pub use user_messages::ErrorHandler;
