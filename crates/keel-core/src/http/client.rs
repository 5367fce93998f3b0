//! HTTP client with retry, backoff and health reporting

use super::config::HttpConfig;
use super::request::{HttpRequest, HttpResponse};
use super::transport::{HttpTransport, ReqwestTransport};
use crate::error::{KeelResult, classify_error};
use crate::recovery::{RetryConfig, RetryPolicy};
use crate::telemetry::HealthMonitor;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Wraps a transport with the retry loop.
///
/// Every attempt is reported to the attached monitor: attempts that got a
/// response go to `record_api_call` (which counts status >= 400 as an error),
/// attempts without one go to `record_error`.
#[derive(Clone)]
pub struct RetryingClient {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
    base_url: Option<String>,
    monitor: Option<Arc<HealthMonitor>>,
}

impl RetryingClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            base_url: None,
            monitor: None,
        }
    }

    /// Build a reqwest-backed client
    pub fn from_config(http: &HttpConfig, retry: RetryConfig) -> KeelResult<Self> {
        let transport = ReqwestTransport::new(http)?;
        let mut client = Self::new(Arc::new(transport), RetryPolicy::new(retry));
        client.base_url = http.base_url.clone();
        Ok(client)
    }

    pub fn with_monitor(mut self, monitor: Arc<HealthMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send with the client's own policy
    pub async fn execute(&self, request: HttpRequest) -> KeelResult<HttpResponse> {
        self.execute_with(request, &self.policy).await
    }

    /// Send with a one-off policy
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn execute_with(
        &self,
        mut request: HttpRequest,
        policy: &RetryPolicy,
    ) -> KeelResult<HttpResponse> {
        request.url = self.resolve_url(&request.url);
        let request = &request;
        policy.execute(|| self.attempt(request)).await
    }

    pub async fn get(&self, url: &str) -> KeelResult<HttpResponse> {
        self.execute(HttpRequest::get(url)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> KeelResult<HttpResponse> {
        self.execute(HttpRequest::post(url).json(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> KeelResult<HttpResponse> {
        self.execute(HttpRequest::put(url).json(serde_json::to_value(body)?))
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> KeelResult<HttpResponse> {
        self.execute(HttpRequest::patch(url).json(serde_json::to_value(body)?))
            .await
    }

    pub async fn delete(&self, url: &str) -> KeelResult<HttpResponse> {
        self.execute(HttpRequest::delete(url)).await
    }

    /// GET and decode the body as JSON
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> KeelResult<T> {
        self.get(url).await?.json()
    }

    fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.starts_with("http://") && !url.starts_with("https://") => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            _ => url.to_string(),
        }
    }

    async fn attempt(&self, request: &HttpRequest) -> KeelResult<HttpResponse> {
        let started = Instant::now();
        let result = self.transport.send(request).await;
        let elapsed = started.elapsed();

        match result {
            Ok(response) => {
                if let Some(monitor) = &self.monitor {
                    monitor.record_api_call(
                        request.method.as_str(),
                        &request.url,
                        response.status(),
                        elapsed,
                    );
                }
                debug!(
                    status = response.status(),
                    duration_ms = elapsed.as_millis() as u64,
                    "response received"
                );
                if response.status() >= 400 {
                    Err(response.into_error(&request.url))
                } else {
                    Ok(response)
                }
            }
            Err(error) => {
                if let Some(monitor) = &self.monitor {
                    monitor.record_error(classify_error(&error).error_type.as_str(), &error);
                }
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for RetryingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingClient")
            .field("policy", &self.policy)
            .field("base_url", &self.base_url)
            .field("monitor", &self.monitor.is_some())
            .finish_non_exhaustive()
    }
}

