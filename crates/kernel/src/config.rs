use std::time::Duration;

use vehicle::SpeedRates;

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Timing and sizing knobs for the kernel's loops.
///
/// Defaults match the production cadences; tests shrink the intervals to
/// run scenarios in milliseconds instead of seconds.
#[derive(Clone, Debug)]
pub struct KernelConfig {
    /// Bounded task queue capacity; submissions beyond it are dropped.
    pub queue_capacity: usize,
    /// How long the processor blocks waiting for a task before re-checking
    /// the stop flag.
    pub queue_poll_timeout: Duration,
    /// Fixed pause after every task execution, bounding task throughput.
    pub task_pacing: Duration,
    /// Speed controller tick interval.
    pub speed_interval: Duration,
    /// Metrics simulator tick interval.
    pub metrics_interval: Duration,
    /// Sleep between cadence checks in the periodic loops.
    pub idle_sleep: Duration,
    /// How long `stop` waits for each worker before giving up on it.
    pub join_timeout: Duration,
    /// Per-tick speed change caps.
    pub rates: SpeedRates,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            queue_poll_timeout: Duration::from_millis(100),
            task_pacing: Duration::from_millis(10),
            speed_interval: Duration::from_millis(50),
            metrics_interval: Duration::from_millis(500),
            idle_sleep: Duration::from_millis(10),
            join_timeout: Duration::from_secs(1),
            rates: SpeedRates::default(),
        }
    }
}
