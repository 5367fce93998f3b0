//! Tests for the retrying client

use super::*;
use crate::error::{ErrorType, KeelError, KeelResult, classify_error};
use crate::recovery::{ConstantBackoff, RetryConfig, RetryPolicy};
use crate::telemetry::{HealthConfig, HealthMonitor};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Replays canned outcomes in order, then keeps repeating the last one
struct ScriptedTransport {
    script: Mutex<VecDeque<KeelResult<HttpResponse>>>,
    last: Mutex<Option<KeelResult<HttpResponse>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn new(script: Vec<KeelResult<HttpResponse>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.seen.lock().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> KeelResult<HttpResponse> {
        self.seen.lock().push(request.clone());
        let next = self.script.lock().pop_front();
        match next {
            Some(outcome) => {
                *self.last.lock() = Some(outcome.clone());
                outcome
            }
            None => self
                .last
                .lock()
                .clone()
                .unwrap_or_else(|| Ok(HttpResponse::new(200))),
        }
    }
}

fn client(transport: Arc<ScriptedTransport>, max_retries: u32) -> RetryingClient {
    RetryingClient::new(
        transport,
        RetryPolicy::new(RetryConfig::default().with_max_retries(max_retries)),
    )
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_three_unavailable_responses() {
    let transport = ScriptedTransport::new(vec![
        Ok(HttpResponse::new(503)),
        Ok(HttpResponse::new(503)),
        Ok(HttpResponse::new(503)),
        Ok(HttpResponse::new(200).with_body("done")),
    ]);
    let retries = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&retries);
    let policy = RetryPolicy::new(RetryConfig::default().with_max_retries(3))
        .with_on_retry(move |error, attempt| recorded.lock().push((error.status_code(), attempt)));
    let client = RetryingClient::new(transport.clone(), policy);

    let response = client.get("https://tracker.test/api/projects").await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "done");
    assert_eq!(transport.calls(), 4);
    assert_eq!(
        *retries.lock(),
        vec![(Some(503), 1), (Some(503), 2), (Some(503), 3)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_max_retries() {
    let transport = ScriptedTransport::new(vec![Err(KeelError::network("connection reset"))]);
    let client = client(transport.clone(), 2);

    let err = client.get("https://tracker.test/health").await.unwrap_err();

    assert!(matches!(err, KeelError::Network { .. }));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_client_error_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Ok(HttpResponse::new(422)
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"message":"Title is required"}"#))]);
    let client = client(transport.clone(), 3);

    let err = client
        .post("https://tracker.test/api/testcases", &serde_json::json!({}))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 1);
    let classification = classify_error(&err);
    assert_eq!(classification.error_type, ErrorType::Client);
    assert_eq!(classification.user_message, "Title is required");
    assert!(!classification.should_retry);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_response_keeps_retry_after() {
    let transport = ScriptedTransport::new(vec![Ok(
        HttpResponse::new(429).with_header("Retry-After", "7")
    )]);
    let client = client(transport.clone(), 0);

    let err = client.get("https://tracker.test/api/runs").await.unwrap_err();

    let classification = classify_error(&err);
    assert_eq!(classification.error_type, ErrorType::RateLimit);
    assert_eq!(classification.retry_after, Some(Duration::from_secs(7)));
    assert_eq!(err.url(), Some("https://tracker.test/api/runs"));
}

#[tokio::test(start_paused = true)]
async fn test_base_url_and_verbs() {
    let transport = ScriptedTransport::new(vec![]);
    let client = client(transport.clone(), 0).with_base_url("https://tracker.test/api/");

    client.get("/projects").await.unwrap();
    client.put("projects/1", &serde_json::json!({"name": "x"})).await.unwrap();
    client.patch("projects/1", &serde_json::json!({"name": "y"})).await.unwrap();
    client.delete("https://other.test/projects/1").await.unwrap();

    let seen = transport.seen.lock();
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].url, "https://tracker.test/api/projects");
    assert_eq!(seen[1].method, Method::PUT);
    assert_eq!(seen[1].body, Some(serde_json::json!({"name": "x"})));
    assert_eq!(seen[2].method, Method::PATCH);
    assert_eq!(seen[3].method, Method::DELETE);
    assert_eq!(seen[3].url, "https://other.test/projects/1");
}

#[tokio::test(start_paused = true)]
async fn test_get_json_decodes_body() {
    #[derive(serde::Deserialize)]
    struct Project {
        id: u32,
        name: String,
    }

    let transport = ScriptedTransport::new(vec![Ok(
        HttpResponse::new(200).with_body(r#"{"id": 42, "name": "checkout"}"#)
    )]);
    let project: Project = client(transport, 0)
        .get_json("https://tracker.test/api/projects/42")
        .await
        .unwrap();

    assert_eq!(project.id, 42);
    assert_eq!(project.name, "checkout");
}

#[tokio::test(start_paused = true)]
async fn test_every_attempt_is_reported_to_monitor() {
    let monitor = Arc::new(HealthMonitor::new(HealthConfig::default()));
    let transport = ScriptedTransport::new(vec![
        Err(KeelError::network("connection refused")),
        Ok(HttpResponse::new(502)),
        Ok(HttpResponse::new(200)),
    ]);
    let client = client(transport, 3).with_monitor(Arc::clone(&monitor));

    client.get("https://tracker.test/api/projects").await.unwrap();

    let metrics = monitor.snapshot();
    assert_eq!(metrics.api_calls_last_hour, 2);
    assert_eq!(metrics.errors_last_hour, 2);
}

#[tokio::test(start_paused = true)]
async fn test_retried_and_failed_calls_count_as_errors() {
    let monitor = Arc::new(HealthMonitor::new(HealthConfig::default()));
    let transport = ScriptedTransport::new(vec![Ok(HttpResponse::new(503))]);
    let client = client(transport, 3).with_monitor(Arc::clone(&monitor));

    assert!(client.get("https://tracker.test/api/projects").await.is_err());

    assert_eq!(monitor.snapshot().errors_last_hour, 4);
}

#[test]
fn test_response_headers_are_case_insensitive() {
    let response = HttpResponse::new(200).with_header("X-Request-Id", "abc");
    assert_eq!(response.header("x-request-id"), Some("abc"));
    assert_eq!(response.header("X-REQUEST-ID"), Some("abc"));
    assert!(response.is_success());
    assert!(response.json::<serde_json::Value>().is_err());
}

mod reqwest_transport {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn no_wait_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig::default().with_max_retries(max_retries))
            .with_backoff(ConstantBackoff::new(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_returns_error_statuses_as_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects/7"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(&HttpConfig::default()).unwrap();
        let request = HttpRequest::get(format!("{}/api/projects/7", server.uri()));
        let response = transport.send(&request).await.unwrap();

        assert_eq!(response.status(), 404);
        assert_eq!(response.text(), "missing");
    }

    #[tokio::test]
    async fn test_retries_against_live_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = RetryingClient::from_config(
            &HttpConfig::default().with_base_url(server.uri()),
            RetryConfig::default(),
        )
        .unwrap()
        .with_policy(no_wait_policy(3));

        let response = client.get("/flaky").await.unwrap();
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn test_sends_default_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/runs"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let config = HttpConfig::default()
            .with_base_url(server.uri())
            .with_header("x-api-key", "secret");
        let client = RetryingClient::from_config(&config, RetryConfig::no_retry()).unwrap();

        let response = client
            .post("/api/runs", &serde_json::json!({"suite": "smoke"}))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_network_error() {
        let config = HttpConfig {
            connect_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let client = RetryingClient::from_config(&config, RetryConfig::no_retry()).unwrap();

        let err = client.get("http://127.0.0.1:9/unreachable").await.unwrap_err();
        assert!(err.is_no_response());
        assert!(classify_error(&err).should_retry);
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let config = HttpConfig::default()
            .with_base_url(server.uri())
            .with_request_timeout(Duration::from_millis(100));
        let client = RetryingClient::from_config(&config, RetryConfig::no_retry()).unwrap();

        let err = client.get("/slow").await.unwrap_err();
        assert!(matches!(err, KeelError::Timeout { .. }));
        assert_eq!(classify_error(&err).error_type, ErrorType::Timeout);
    }
}
