//! Outbound HTTP with retries
//!
//! `HttpTransport` performs one attempt; `RetryingClient` runs the retry loop
//! around it and converts error statuses into `KeelError::Http` so the
//! classifier can map them onto the failure taxonomy.

mod client;
mod config;
mod request;
mod transport;

#[cfg(test)]
mod tests;

pub use client::RetryingClient;
pub use config::HttpConfig;
pub use request::{HttpRequest, HttpResponse};
pub use reqwest::Method;
pub use transport::{HttpTransport, ReqwestTransport};
