//! Tests for error classification

use super::*;
use std::time::Duration;

fn status(code: u16) -> KeelError {
    KeelError::http(code, "upstream failure")
}

#[test]
fn test_server_errors_are_retryable() {
    for code in [500, 502, 503, 504] {
        let classified = classify_error(&status(code));
        assert_eq!(classified.error_type, ErrorType::Server, "status {}", code);
        assert!(classified.should_retry);
        assert!(classified.user_message.contains("servers"));
    }
}

#[test]
fn test_auth_errors_are_terminal() {
    let unauthorized = classify_error(&status(401));
    assert_eq!(unauthorized.error_type, ErrorType::Auth);
    assert!(!unauthorized.should_retry);
    assert!(unauthorized.user_message.contains("log in"));

    let forbidden = classify_error(&status(403));
    assert_eq!(forbidden.error_type, ErrorType::Auth);
    assert!(!forbidden.should_retry);
    assert!(forbidden.user_message.contains("permission"));
}

#[test]
fn test_network_error_is_retryable() {
    let classified = classify_error(&KeelError::network("connection refused"));
    assert_eq!(classified.error_type, ErrorType::Network);
    assert!(classified.should_retry);
    assert!(!classified.user_message.contains("refused"));
}

#[test]
fn test_timeout_status_and_client_timeout() {
    let classified = classify_error(&status(408));
    assert_eq!(classified.error_type, ErrorType::Timeout);
    assert!(classified.should_retry);

    let classified = classify_error(&KeelError::timeout(Duration::from_secs(30)));
    assert_eq!(classified.error_type, ErrorType::Timeout);
    assert!(classified.should_retry);
}

#[test]
fn test_not_found_names_resource() {
    let error = status(404).with_url("https://tracker.local/api/projects/42");
    let classified = classify_error(&error);
    assert_eq!(classified.error_type, ErrorType::NotFound);
    assert!(!classified.should_retry);
    assert_eq!(
        classified.user_message,
        "The requested project could not be found."
    );

    let generic = classify_error(&status(404));
    assert_eq!(
        generic.user_message,
        "The requested resource could not be found."
    );
}

#[test]
fn test_rate_limit_uses_retry_after_seconds() {
    let error = status(429).with_retry_after("12");
    let classified = classify_error(&error);
    assert_eq!(classified.error_type, ErrorType::RateLimit);
    assert!(classified.should_retry);
    assert_eq!(classified.retry_after, Some(Duration::from_millis(12_000)));
    assert!(classified.user_message.contains("12 seconds"));
}

#[test]
fn test_rate_limit_defaults_without_header() {
    let classified = classify_error(&status(429));
    assert_eq!(classified.retry_after, Some(DEFAULT_RATE_LIMIT_WAIT));
    assert!(classified.user_message.contains("60 seconds"));
}

#[test]
fn test_rate_limit_garbage_header_falls_back() {
    let classified = classify_error(&status(429).with_retry_after("soon"));
    assert_eq!(classified.retry_after, Some(DEFAULT_RATE_LIMIT_WAIT));
}

#[test]
fn test_retry_after_http_date_in_past_is_zero() {
    let parsed = parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT");
    assert_eq!(parsed, Some(Duration::ZERO));
}

#[test]
fn test_retry_after_http_date_in_future_is_remaining_time() {
    let at = chrono::Utc::now() + chrono::Duration::seconds(90);
    let parsed = parse_retry_after(&at.to_rfc2822()).unwrap();

    // the header has whole-second precision
    assert!(parsed <= Duration::from_secs(90), "parsed {:?}", parsed);
    assert!(parsed >= Duration::from_secs(85), "parsed {:?}", parsed);

    let classified = classify_error(&status(429).with_retry_after(at.to_rfc2822()));
    assert_eq!(classified.error_type, ErrorType::RateLimit);
    let wait = classified.retry_after.unwrap();
    assert!(wait > Duration::from_secs(85) && wait <= Duration::from_secs(90));
}

#[test]
fn test_client_error_message_from_body() {
    let error = status(422).with_body(r#"{"message": "Name is required"}"#);
    let classified = classify_error(&error);
    assert_eq!(classified.error_type, ErrorType::Client);
    assert!(!classified.should_retry);
    assert_eq!(classified.user_message, "Name is required");

    let error = status(400).with_body("<html>bad</html>");
    let classified = classify_error(&error);
    assert!(classified.user_message.contains("problem with your request"));
}

#[test]
fn test_unknown_fallback() {
    let classified = classify_error(&KeelError::other("boom"));
    assert_eq!(classified.error_type, ErrorType::Unknown);
    assert!(!classified.should_retry);

    let classified = classify_error(&status(501));
    assert_eq!(classified.error_type, ErrorType::Unknown);
    assert!(!classified.should_retry);
}

#[test]
fn test_classification_is_deterministic() {
    let error = status(503);
    assert_eq!(classify_error(&error), classify_error(&error));
}

#[test]
fn test_error_handler_hides_raw_text() {
    let handler = ErrorHandler::new();
    let error = KeelError::other("stack trace: at foo.rs:12");
    let message = handler.user_message(&error, "test");
    assert!(!message.contains("foo.rs"));
}

#[test]
fn test_error_accessors() {
    let error = status(503).with_url("https://api.local/x");
    assert_eq!(error.status_code(), Some(503));
    assert_eq!(error.url(), Some("https://api.local/x"));
    assert!(!error.is_no_response());
    assert!(KeelError::network("down").is_no_response());
    assert_eq!(KeelError::network("down").error_code(), "KEEL_NETWORK");
}
