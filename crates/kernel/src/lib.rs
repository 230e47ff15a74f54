//! Concurrent vehicle control core.
//!
//! Three background loops share one store: the task processor drains the
//! bounded queue, the speed controller steers current speed toward the
//! target, and the metrics simulator produces smoothed telemetry. A single
//! stop flag gives each loop bounded shutdown latency.

mod cadence;
mod config;
mod control;
mod processor;
mod queue;

pub use config::KernelConfig;
pub use control::ControlKernel;
pub use queue::TaskQueue;
