//! Composition root for the resilience layer
//!
//! Builds every component from one [`KeelConfig`], owns their periodic tasks
//! and tears everything down on [`shutdown`](ResilienceLayer::shutdown). The
//! layer never installs signal handlers; the host process decides when to
//! start and stop it.

use crate::config::KeelConfig;
use crate::error::{ErrorClassification, ErrorHandler, KeelResult};
use crate::http::{HttpTransport, ReqwestTransport, RetryingClient};
use crate::recovery::{RateLimitScope, RateLimiter, RateLimiters, RetryPolicy};
use crate::session::SessionCache;
use crate::tasks::PeriodicTask;
use crate::telemetry::HealthMonitor;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

/// Why a dispatched command did not produce a result
#[derive(Debug, Clone, Error)]
pub enum CommandFailure {
    /// Rejected before running
    #[error("rate limited on {scope}, retry in {}ms", retry_after.as_millis())]
    RateLimited {
        scope: RateLimitScope,
        retry_after: Duration,
    },
    /// Ran and failed
    #[error("{}", classification.user_message)]
    Failed { classification: ErrorClassification },
}

impl CommandFailure {
    /// Text to show the end user
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited { retry_after, .. } => {
                let seconds = retry_after.as_millis().div_ceil(1000).max(1);
                format!(
                    "You're doing that too often. Please wait {} seconds and try again.",
                    seconds
                )
            }
            Self::Failed { classification } => classification.user_message.clone(),
        }
    }
}

pub struct ResilienceLayer {
    config: KeelConfig,
    sessions: Arc<SessionCache>,
    limiters: RateLimiters,
    monitor: Arc<HealthMonitor>,
    client: RetryingClient,
    error_handler: ErrorHandler,
    tasks: Mutex<Vec<PeriodicTask>>,
}

impl ResilienceLayer {
    /// Build with a reqwest-backed HTTP client
    pub fn new(config: KeelConfig) -> KeelResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.http)?);
        Self::with_transport(config, transport)
    }

    /// Build with a custom transport
    pub fn with_transport(
        config: KeelConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> KeelResult<Self> {
        config.validate()?;

        let sessions = Arc::new(SessionCache::new(config.session.clone()));
        let limiters = RateLimiters::new(&config.rate_limits);
        let monitor = Arc::new(
            HealthMonitor::new(config.health.clone()).with_session_cache(Arc::clone(&sessions)),
        );
        let mut client = RetryingClient::new(transport, RetryPolicy::new(config.retry.clone()))
            .with_monitor(Arc::clone(&monitor));
        if let Some(base_url) = &config.http.base_url {
            client = client.with_base_url(base_url.clone());
        }

        Ok(Self {
            config,
            sessions,
            limiters,
            monitor,
            client,
            error_handler: ErrorHandler::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the periodic sweeps and the health check. Calling it again while
    /// running is a no-op.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            return;
        }
        tasks.push(PeriodicTask::schedule(Arc::clone(&self.sessions)));
        for limiter in self.limiters.iter() {
            tasks.push(PeriodicTask::schedule(Arc::clone(limiter)));
        }
        tasks.push(PeriodicTask::schedule(Arc::clone(&self.monitor)));
        info!(tasks = tasks.len(), "resilience layer started");
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.lock().is_empty()
    }

    /// Stop every task and clear every in-memory collection
    pub async fn shutdown(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            let name = task.name();
            task.stop().await;
            debug!(task = name, "stopped");
        }
        self.sessions.clear_all();
        self.limiters.clear();
        self.monitor.clear();
        info!("resilience layer shut down");
    }

    /// Run one command for `actor_id` under the `scope` limit.
    ///
    /// A rejection is reported as a rate-limit hit. Otherwise the outcome and
    /// duration are recorded, and a failure comes back with only the
    /// user-facing message; the raw error is logged.
    pub async fn dispatch<T, F, Fut>(
        &self,
        actor_id: &str,
        command: &str,
        scope: RateLimitScope,
        operation: F,
    ) -> Result<T, CommandFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = KeelResult<T>>,
    {
        let limiter = self.limiters.get(scope);
        if !limiter.is_allowed(actor_id) {
            self.monitor.record_rate_limit_hit(actor_id, scope);
            return Err(CommandFailure::RateLimited {
                scope,
                retry_after: limiter.retry_after(actor_id).unwrap_or_default(),
            });
        }

        let started = Instant::now();
        let result = operation().await;
        self.monitor
            .record_command(command, result.is_ok(), started.elapsed());

        result.map_err(|error| CommandFailure::Failed {
            classification: self.error_handler.handle(&error, command),
        })
    }

    /// Entry point for the host's panic and unhandled-error interception
    pub fn record_process_error(&self, kind: &str, error: impl fmt::Display) {
        self.monitor.record_error(kind, error);
    }

    pub fn config(&self) -> &KeelConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionCache> {
        &self.sessions
    }

    pub fn limiters(&self) -> &RateLimiters {
        &self.limiters
    }

    pub fn limiter(&self, scope: RateLimitScope) -> &Arc<RateLimiter> {
        self.limiters.get(scope)
    }

    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    pub fn client(&self) -> &RetryingClient {
        &self.client
    }

    pub fn error_handler(&self) -> &ErrorHandler {
        &self.error_handler
    }
}

impl fmt::Debug for ResilienceLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilienceLayer")
            .field("running", &self.is_running())
            .field("sessions", &self.sessions.session_count())
            .finish_non_exhaustive()
    }
}
