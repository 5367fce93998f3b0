//! Pure classification of failures into the stable error taxonomy

use super::types::{ErrorClassification, ErrorType, KeelError};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Wait applied to a 429 that carries no usable `Retry-After` header
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_millis(60_000);

const NETWORK_MESSAGE: &str =
    "Unable to reach the service right now. Please check your connection and try again.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
const FORBIDDEN_MESSAGE: &str = "You don't have permission to perform this action.";
const TIMEOUT_MESSAGE: &str = "The request took too long to complete. Please try again.";
const SERVER_MESSAGE: &str =
    "Our servers are experiencing issues right now. Please try again in a few minutes.";
const CLIENT_MESSAGE: &str = "There was a problem with your request. Please check it and try again.";
const UNKNOWN_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Classify a failure.
///
/// Pure: the same error always yields the same classification, except that an
/// HTTP-date `Retry-After` is measured against the current wall clock.
pub fn classify_error(error: &KeelError) -> ErrorClassification {
    match error {
        KeelError::Network { .. } => classification(ErrorType::Network, NETWORK_MESSAGE, true),
        KeelError::Timeout { .. } => classification(ErrorType::Timeout, TIMEOUT_MESSAGE, true),
        KeelError::Http {
            status_code,
            url,
            retry_after,
            body,
            ..
        } => classify_status(*status_code, url.as_deref(), retry_after.as_deref(), body.as_deref()),
        _ => classification(ErrorType::Unknown, UNKNOWN_MESSAGE, false),
    }
}

fn classify_status(
    status: u16,
    url: Option<&str>,
    retry_after: Option<&str>,
    body: Option<&str>,
) -> ErrorClassification {
    match status {
        401 => classification(ErrorType::Auth, SESSION_EXPIRED_MESSAGE, false),
        403 => classification(ErrorType::Auth, FORBIDDEN_MESSAGE, false),
        404 => {
            let message = match url.and_then(resource_from_url) {
                Some(resource) => format!("The requested {} could not be found.", resource),
                None => "The requested resource could not be found.".to_string(),
            };
            classification(ErrorType::NotFound, message, false)
        }
        408 => classification(ErrorType::Timeout, TIMEOUT_MESSAGE, true),
        429 => {
            let wait = retry_after
                .and_then(parse_retry_after)
                .unwrap_or(DEFAULT_RATE_LIMIT_WAIT);
            let seconds = wait.as_millis().div_ceil(1000);
            ErrorClassification {
                error_type: ErrorType::RateLimit,
                user_message: format!(
                    "Too many requests. Please wait {} seconds before trying again.",
                    seconds
                ),
                should_retry: true,
                retry_after: Some(wait),
            }
        }
        500 | 502 | 503 | 504 => classification(ErrorType::Server, SERVER_MESSAGE, true),
        400..=499 => {
            let message = body
                .and_then(message_from_body)
                .unwrap_or_else(|| CLIENT_MESSAGE.to_string());
            classification(ErrorType::Client, message, false)
        }
        _ => classification(ErrorType::Unknown, UNKNOWN_MESSAGE, false),
    }
}

fn classification(
    error_type: ErrorType,
    message: impl Into<String>,
    should_retry: bool,
) -> ErrorClassification {
    ErrorClassification {
        error_type,
        user_message: message.into(),
        should_retry,
        retry_after: None,
    }
}

/// Parse a `Retry-After` header value.
///
/// Integer values are seconds. HTTP-dates are converted to the remaining wait,
/// floored at zero. Anything else yields `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_millis(seconds.saturating_mul(1000)));
    }
    if let Ok(seconds) = value.parse::<f64>() {
        if seconds.is_finite() && seconds >= 0.0 {
            return Some(Duration::from_millis((seconds * 1000.0) as u64));
        }
        return None;
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?;
    let remaining = at.with_timezone(&Utc) - Utc::now();
    Some(remaining.to_std().unwrap_or(Duration::ZERO))
}

/// Pull a human message out of a JSON error body (`message` or `error`)
fn message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|field| field.as_str())
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

/// Derive a resource noun from a request URL (`/api/projects/42` -> `project`)
fn resource_from_url(url: &str) -> Option<String> {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let segment = path
        .split('/')
        .rev()
        .filter(|segment| !segment.is_empty())
        .find(|segment| !looks_like_identifier(segment) && !is_api_prefix(segment))?;

    let noun = segment.replace(['-', '_'], " ").to_lowercase();
    let singular = if noun.len() > 3 && noun.ends_with('s') && !noun.ends_with("ss") {
        noun[..noun.len() - 1].to_string()
    } else {
        noun
    };
    Some(singular)
}

fn looks_like_identifier(segment: &str) -> bool {
    let has_digit = segment.chars().any(|c| c.is_ascii_digit());
    let all_hex = segment.chars().all(|c| c.is_ascii_hexdigit() || c == '-');
    segment.chars().all(|c| c.is_ascii_digit()) || (has_digit && all_hex && segment.len() >= 8)
}

fn is_api_prefix(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("api")
        || (segment.len() <= 3
            && segment.starts_with('v')
            && segment[1..].chars().all(|c| c.is_ascii_digit()))
}
