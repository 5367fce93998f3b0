//! Process-level samples taken on each health check

use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::time::Instant;

/// Memory in use against the memory the process may use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub used_bytes: u64,
    pub budget_bytes: u64,
}

impl MemoryUsage {
    pub fn new(used_bytes: u64, budget_bytes: u64) -> Self {
        Self {
            used_bytes,
            budget_bytes,
        }
    }

    /// `used / budget`, 0 when the budget is unknown
    pub fn ratio(&self) -> f64 {
        if self.budget_bytes == 0 {
            0.0
        } else {
            self.used_bytes as f64 / self.budget_bytes as f64
        }
    }
}

/// Anything that can report memory usage
pub trait MemorySource: Send + Sync {
    fn sample(&self) -> MemoryUsage;
}

/// Resident memory of the current process, via sysinfo
pub struct ProcessMemory {
    system: Mutex<System>,
    pid: Option<Pid>,
    budget_bytes: Option<u64>,
}

impl ProcessMemory {
    /// Without `budget_bytes`, the cgroup memory limit is used when one is set,
    /// otherwise total system memory
    pub fn new(budget_bytes: Option<u64>) -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: sysinfo::get_current_pid().ok(),
            budget_bytes,
        }
    }
}

impl MemorySource for ProcessMemory {
    fn sample(&self) -> MemoryUsage {
        let mut sys = self.system.lock();
        sys.refresh_memory();

        let used_bytes = match self.pid {
            Some(pid) => {
                sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                sys.process(pid).map(|p| p.memory()).unwrap_or(0)
            }
            None => sys.used_memory(),
        };
        let cgroup_limit = sys.cgroup_limits().map(|limits| limits.total_memory);
        let budget_bytes = memory_budget(self.budget_bytes, cgroup_limit, sys.total_memory());

        MemoryUsage::new(used_bytes, budget_bytes)
    }
}

fn memory_budget(explicit: Option<u64>, cgroup_limit: Option<u64>, total: u64) -> u64 {
    let cgroup_limit = cgroup_limit.filter(|&limit| limit > 0 && limit < total);
    explicit.or(cgroup_limit).unwrap_or(total)
}

impl std::fmt::Debug for ProcessMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessMemory")
            .field("pid", &self.pid)
            .field("budget_bytes", &self.budget_bytes)
            .finish()
    }
}

const DELAY_PROBE_SLEEP: Duration = Duration::from_millis(10);

/// How late a short timer fires.
///
/// A timer wake-up queues behind every runnable task, so the lateness grows
/// when the runtime's workers are saturated or blocked.
pub async fn measure_event_loop_delay() -> Duration {
    let started = Instant::now();
    tokio::time::sleep(DELAY_PROBE_SLEEP).await;
    started.elapsed().saturating_sub(DELAY_PROBE_SLEEP)
}
