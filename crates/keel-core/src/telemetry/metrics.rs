//! Counters backing the health snapshot

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Trailing window of the hourly counters
pub const HOUR: Duration = Duration::from_secs(60 * 60);

/// Counter metric (monotonically increasing)
#[derive(Debug)]
pub struct Counter {
    name: &'static str,
    value: AtomicU64,
}

impl Counter {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            value: AtomicU64::new(0),
        }
    }

    /// Increment by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// Counter keyed by one label (e.g. error kind)
#[derive(Debug, Default)]
pub struct LabeledCounter {
    counters: RwLock<HashMap<String, AtomicU64>>,
}

impl LabeledCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, label: &str) {
        if let Some(counter) = self.counters.read().get(label) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.counters
            .write()
            .entry(label.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, label: &str) -> u64 {
        self.counters
            .read()
            .get(label)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// All series, sorted by label
    pub fn get_all(&self) -> Vec<(String, u64)> {
        let mut all: Vec<_> = self
            .counters
            .read()
            .iter()
            .map(|(label, counter)| (label.clone(), counter.load(Ordering::Relaxed)))
            .collect();
        all.sort();
        all
    }

    pub fn reset(&self) {
        self.counters.write().clear();
    }
}

/// Event timestamps pruned to a trailing window on every update.
///
/// An event at `t` counts while `now - t < window`.
#[derive(Debug)]
pub struct SlidingWindowCounter {
    window: Duration,
    events: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn hourly() -> Self {
        Self::new(HOUR)
    }

    /// Record one event now and return the pruned count
    pub fn record(&self) -> usize {
        let now = Instant::now();
        let mut events = self.events.lock();
        events.push_back(now);
        Self::prune(&mut events, now, self.window);
        events.len()
    }

    /// Events inside the window; prunes but records nothing
    pub fn count(&self) -> usize {
        let now = Instant::now();
        let mut events = self.events.lock();
        Self::prune(&mut events, now, self.window);
        events.len()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn prune(events: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while events
            .front()
            .is_some_and(|at| now.duration_since(*at) >= window)
        {
            events.pop_front();
        }
    }
}
