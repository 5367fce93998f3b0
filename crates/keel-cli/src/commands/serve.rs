//! `keel serve`: host the layer until a shutdown signal arrives

use crate::signal_handler::{ShutdownSignal, signal_name};
use anyhow::{Context, Result};
use keel_core::{KeelConfig, ResilienceLayer};
use std::sync::{Arc, Weak};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

pub async fn run(config: KeelConfig) -> Result<()> {
    let interval = config.health.check_interval;
    let layer = Arc::new(ResilienceLayer::new(config)?);
    install_panic_hook(Arc::downgrade(&layer));

    let mut signals = ShutdownSignal::install().context("Failed to install signal handlers")?;
    layer.start();
    info!(
        health_interval_ms = interval.as_millis() as u64,
        "keel is running; press Ctrl+C to stop"
    );

    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            signal = signals.recv() => {
                match signal {
                    Some(signal) => info!(signal = signal_name(signal), "shutdown signal received"),
                    None => warn!("signal stream closed"),
                }
                break;
            }
            _ = ticker.tick() => log_status(&layer),
        }
    }

    layer.shutdown().await;
    Ok(())
}

fn log_status(layer: &ResilienceLayer) {
    let status = layer.monitor().status();
    let metrics = &status.metrics;
    info!(
        status = %status.status,
        uptime_secs = metrics.uptime.as_secs(),
        memory_pct = %format_args!("{:.1}", metrics.memory.ratio() * 100.0),
        event_loop_delay_ms = metrics.event_loop_delay.as_millis() as u64,
        active_sessions = metrics.active_sessions,
        commands = metrics.commands_processed,
        errors_last_hour = metrics.errors_last_hour,
        api_calls_last_hour = metrics.api_calls_last_hour,
        alerts = status.summary.total,
        "health"
    );
}

/// Panics anywhere in the process count toward the error rate
fn install_panic_hook(layer: Weak<ResilienceLayer>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        if let Some(layer) = layer.upgrade() {
            layer.record_process_error("panic", panic);
        }
        previous(panic);
    }));
}
