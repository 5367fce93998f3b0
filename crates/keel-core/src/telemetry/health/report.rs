//! Operator-facing text report

use super::monitor::HealthMonitor;
use std::fmt::Write;
use std::time::Duration;

const MB: f64 = 1024.0 * 1024.0;

impl HealthMonitor {
    /// Multi-line report for dashboards and diagnostic commands
    pub fn report(&self) -> String {
        let status = self.status();
        let m = &status.metrics;
        let mut out = String::new();

        let _ = writeln!(out, "Health Report");
        let _ = writeln!(out, "=============");
        let _ = writeln!(out, "Status: {}", status.status.as_str().to_uppercase());
        let _ = writeln!(out, "Uptime: {}", format_duration(m.uptime));
        let _ = writeln!(
            out,
            "Memory: {:.1} MB / {:.1} MB ({:.1}%)",
            m.memory.used_bytes as f64 / MB,
            m.memory.budget_bytes as f64 / MB,
            m.memory.ratio() * 100.0
        );
        let _ = writeln!(out, "Event loop delay: {}ms", m.event_loop_delay.as_millis());
        if let Some(checked) = m.last_check {
            let _ = writeln!(out, "Last check: {}", checked.format("%Y-%m-%d %H:%M:%S UTC"));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Counters");
        let _ = writeln!(out, "  Commands processed: {}", m.commands_processed);
        let _ = writeln!(out, "  Errors (last hour): {}", m.errors_last_hour);
        for (kind, count) in &m.errors_by_kind {
            let _ = writeln!(out, "    {}: {}", kind, count);
        }
        let _ = writeln!(out, "  API calls (last hour): {}", m.api_calls_last_hour);
        let _ = writeln!(out, "  Rate limit hits: {}", m.rate_limit_hits);

        let _ = writeln!(out);
        let _ = writeln!(out, "Conversations");
        match &m.sessions {
            Some(stats) => {
                let _ = writeln!(out, "  Active: {}", stats.total_sessions);
                let _ = writeln!(out, "  Messages retained: {}", stats.total_messages);
                let _ = writeln!(
                    out,
                    "  Average per session: {:.1}",
                    stats.average_messages_per_session
                );
                if let Some(age) = stats.oldest_session_age {
                    let _ = writeln!(out, "  Oldest session: {}", format_duration(age));
                }
            }
            None => {
                let _ = writeln!(out, "  (no session cache attached)");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Recent alerts ({}): {} (critical {}, high {}, medium {}, low {})",
            format_duration(self.config().status_window),
            status.summary.total,
            status.summary.critical,
            status.summary.high,
            status.summary.medium,
            status.summary.low
        );
        for alert in status.alerts.iter().rev().take(10) {
            let _ = writeln!(
                out,
                "  [{}] {} {}",
                alert.severity.as_str().to_uppercase(),
                alert.timestamp.format("%H:%M:%S"),
                alert.message
            );
        }

        out
    }
}

/// `1h 2m 3s` style, seconds resolution
pub(crate) fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    match (hours, minutes) {
        (0, 0) => format!("{}s", seconds),
        (0, _) => format!("{}m {}s", minutes, seconds),
        _ => format!("{}h {}m {}s", hours, minutes, seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::format_duration;
    use std::time::Duration;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(999)), "0s");
        assert_eq!(format_duration(Duration::from_secs(300)), "5m 0s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 2m 3s");
    }
}
