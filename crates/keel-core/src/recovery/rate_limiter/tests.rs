//! Tests for rate limiting

use super::*;
use crate::tasks::Maintenance;
use std::time::Duration;
use tokio::time::Instant;

fn limiter(max_requests: u32, window_ms: u64) -> RateLimiter {
    RateLimiter::new(
        RateLimitScope::Commands,
        RateLimitConfig::new(max_requests, Duration::from_millis(window_ms)),
    )
}

#[tokio::test(start_paused = true)]
async fn test_admits_exactly_max_requests() {
    let limiter = limiter(3, 60_000);

    assert!(limiter.is_allowed("alice"));
    assert!(limiter.is_allowed("alice"));
    assert!(limiter.is_allowed("alice"));
    assert!(!limiter.is_allowed("alice"));
    assert!(!limiter.is_allowed("alice"));
    assert_eq!(limiter.remaining("alice"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_window_reopens_after_lapse() {
    let limiter = limiter(4, 60_000);

    for _ in 0..4 {
        assert!(limiter.is_allowed("bob"));
    }
    assert!(!limiter.is_allowed("bob"));

    // Exactly at the reset time the window is still closed.
    tokio::time::advance(Duration::from_millis(60_000)).await;
    assert!(!limiter.is_allowed("bob"));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(limiter.is_allowed("bob"));
    assert_eq!(limiter.remaining("bob"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_burst_at_window_boundary() {
    let limiter = limiter(5, 60_000);

    tokio::time::advance(Duration::from_millis(59_990)).await;
    let started = Instant::now();
    for _ in 0..5 {
        assert!(limiter.is_allowed("carol"));
    }
    tokio::time::advance(Duration::from_millis(60_001)).await;
    for _ in 0..5 {
        assert!(limiter.is_allowed("carol"));
    }
    // Ten admitted calls in just over one window.
    assert!(Instant::now() - started < Duration::from_millis(60_100));
}

#[tokio::test(start_paused = true)]
async fn test_six_calls_within_a_second() {
    let limiter = limiter(5, 60_000);
    let first_call = Instant::now();

    let mut results = Vec::new();
    for _ in 0..6 {
        results.push(limiter.is_allowed("dave"));
        tokio::time::advance(Duration::from_millis(150)).await;
    }

    assert_eq!(results, vec![true, true, true, true, true, false]);
    assert_eq!(
        limiter.reset_time("dave"),
        Some(first_call + Duration::from_millis(60_000))
    );
    assert_eq!(
        limiter.retry_after("dave"),
        Some(Duration::from_millis(59_100))
    );
}

#[tokio::test(start_paused = true)]
async fn test_actors_are_independent() {
    let limiter = limiter(1, 1_000);

    assert!(limiter.is_allowed("a"));
    assert!(!limiter.is_allowed("a"));
    assert!(limiter.is_allowed("b"));
    assert_eq!(limiter.remaining("c"), 1);
    assert_eq!(limiter.reset_time("c"), None);
}

#[tokio::test(start_paused = true)]
async fn test_scopes_never_share_entries() {
    let limiters = RateLimiters::new(&RateLimitsConfig::default());

    for _ in 0..5 {
        assert!(limiters.ai().is_allowed("erin"));
    }
    assert!(!limiters.ai().is_allowed("erin"));
    assert!(limiters.commands().is_allowed("erin"));
    assert!(limiters.api().is_allowed("erin"));

    assert_eq!(limiters.get(RateLimitScope::Commands).remaining("erin"), 14);
    assert_eq!(limiters.get(RateLimitScope::Api).remaining("erin"), 29);
    assert_eq!(limiters.get(RateLimitScope::Ai).remaining("erin"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_entries_do_not_need_sweep() {
    let limiter = limiter(1, 1_000);

    assert!(limiter.is_allowed("frank"));
    tokio::time::advance(Duration::from_millis(1_001)).await;
    assert_eq!(limiter.tracked_actors(), 1);
    assert_eq!(limiter.remaining("frank"), 1);
    assert_eq!(limiter.reset_time("frank"), None);
    assert!(limiter.is_allowed("frank"));
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_removes_stale_entries() {
    let limiter = limiter(2, 1_000).with_sweep_interval(Duration::from_secs(30));

    limiter.is_allowed("old");
    tokio::time::advance(Duration::from_millis(600)).await;
    limiter.is_allowed("new");
    tokio::time::advance(Duration::from_millis(600)).await;

    assert_eq!(limiter.cleanup(), 1);
    assert_eq!(limiter.tracked_actors(), 1);
    assert_eq!(limiter.remaining("new"), 1);

    tokio::time::advance(Duration::from_secs(5)).await;
    limiter.run_maintenance().await;
    assert_eq!(limiter.tracked_actors(), 0);
    assert_eq!(limiter.maintenance_interval(), Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_reset_and_clear() {
    let limiters = RateLimiters::default();
    let commands = limiters.commands();

    for _ in 0..15 {
        commands.is_allowed("gina");
    }
    assert!(!commands.is_allowed("gina"));
    commands.reset("gina");
    assert!(commands.is_allowed("gina"));

    limiters.api().is_allowed("gina");
    limiters.clear();
    assert!(limiters.iter().all(|limiter| limiter.tracked_actors() == 0));
}

#[test]
fn test_default_scope_limits() {
    let config = RateLimitsConfig::default();
    assert_eq!(config.commands.max_requests, 15);
    assert_eq!(config.api.max_requests, 30);
    assert_eq!(config.ai.max_requests, 5);
    for scope in RateLimitScope::ALL {
        assert_eq!(config.for_scope(scope).window, DEFAULT_WINDOW);
    }
}
