//! Single-attempt HTTP transports

use super::config::HttpConfig;
use super::request::{HttpRequest, HttpResponse};
use crate::error::{KeelError, KeelResult};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};

/// Sends one request and returns whatever status comes back.
///
/// Implementations return `Err` only when no response was received.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> KeelResult<HttpResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    request_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> KeelResult<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(val)) => {
                    headers.insert(name, val);
                }
                _ => warn!(header = %key, "skipping invalid default header"),
            }
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| {
                KeelError::config_with_context(
                    format!("Failed to create HTTP client: {}", e),
                    "building reqwest transport",
                )
            })?;

        debug!(
            connect_timeout_ms = config.connect_timeout.as_millis() as u64,
            request_timeout_ms = config.request_timeout.as_millis() as u64,
            "created HTTP transport"
        );

        Ok(Self {
            client,
            request_timeout: config.request_timeout,
        })
    }

    fn map_error(&self, error: reqwest::Error, request: &HttpRequest) -> KeelError {
        if error.is_timeout() {
            KeelError::Timeout {
                elapsed: request.timeout.unwrap_or(self.request_timeout),
                url: Some(request.url.clone()),
            }
        } else if error.is_builder() {
            KeelError::invalid_field("url", format!("{}: {}", request.url, error))
        } else {
            KeelError::network_with_url(error.to_string(), request.url.clone())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> KeelResult<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_error(e, request))?;

        let mut result = HttpResponse::new(response.status().as_u16());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                result = result.with_header(name.as_str(), value);
            }
        }
        let body = response
            .text()
            .await
            .map_err(|e| self.map_error(e, request))?;

        Ok(result.with_body(body))
    }
}
