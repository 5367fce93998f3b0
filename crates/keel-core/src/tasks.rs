//! Periodic background maintenance
//!
//! Components never start timers on their own. Each one describes its sweep by
//! implementing [`Maintenance`]; the owner decides when to [`PeriodicTask::schedule`]
//! it and must [`stop`](PeriodicTask::stop) the returned task on shutdown.
//! Tests drive sweeps by calling `run_maintenance()` directly.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A component with a periodic sweep
#[async_trait]
pub trait Maintenance: Send + Sync + 'static {
    /// Name used in logs
    fn task_name(&self) -> &'static str;

    /// How often the sweep runs
    fn maintenance_interval(&self) -> Duration;

    /// One sweep
    async fn run_maintenance(&self);
}

/// Handle to a repeating background task
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn `tick` every `period`, first run one period from now
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => tick().await,
                }
            }
            debug!(task = name, "periodic task stopped");
        });

        debug!(task = name, period_ms = period.as_millis() as u64, "periodic task started");
        Self {
            name,
            cancel,
            handle: Some(handle),
        }
    }

    /// Run `component.run_maintenance()` on its own interval
    pub fn schedule<T: Maintenance>(component: Arc<T>) -> Self {
        let name = component.task_name();
        let period = component.maintenance_interval();
        Self::spawn(name, period, move || {
            let component = Arc::clone(&component);
            async move { component.run_maintenance().await }
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|handle| handle.is_finished())
    }

    /// Request cancellation without waiting
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the task to exit
    pub async fn stop(mut self) {
        self.cancel.cancel();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(e) = handle.await {
            if e.is_panic() {
                warn!(task = self.name, "periodic task panicked: {}", e);
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counting {
        runs: AtomicU32,
    }

    #[async_trait]
    impl Maintenance for Counting {
        fn task_name(&self) -> &'static str {
            "counting"
        }

        fn maintenance_interval(&self) -> Duration {
            Duration::from_secs(10)
        }

        async fn run_maintenance(&self) {
            self.runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_runs_on_interval() {
        let component = Arc::new(Counting {
            runs: AtomicU32::new(0),
        });
        let task = PeriodicTask::schedule(Arc::clone(&component));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(component.runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(26)).await;
        assert_eq!(component.runs.load(Ordering::SeqCst), 3);

        task.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_future_runs() {
        let component = Arc::new(Counting {
            runs: AtomicU32::new(0),
        });
        let task = PeriodicTask::schedule(Arc::clone(&component));
        assert_eq!(task.name(), "counting");

        tokio::time::sleep(Duration::from_secs(11)).await;
        task.stop().await;
        let runs = component.runs.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(component.runs.load(Ordering::SeqCst), runs);
    }
}
