use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver};
use log::{debug, info, warn};
use parking_lot::Mutex;

use hub::{SubmitOutcome, Task, TaskSinkHandle};
use vehicle::{DrivingMode, Metrics, StateSnapshot, VehicleStore};

use crate::cadence::Cadence;
use crate::config::KernelConfig;
use crate::processor::processor_loop;
use crate::queue::TaskQueue;

struct Worker {
    name: &'static str,
    handle: JoinHandle<()>,
    done_rx: Receiver<()>,
}

/// The vehicle control kernel: owns the store, the task queue and the three
/// background loops.
///
/// `start`/`stop` are idempotent. All communication with the rest of the
/// application goes through the store accessors re-exposed here and the
/// task submission surface; no collaborator reaches the loops directly.
pub struct ControlKernel {
    store: Arc<VehicleStore>,
    queue: TaskQueue,
    config: KernelConfig,
    stop: Arc<AtomicBool>,
    workers: Mutex<Vec<Worker>>,
}

impl ControlKernel {
    pub fn new(config: KernelConfig) -> Self {
        Self::with_store(Arc::new(VehicleStore::new()), config)
    }

    pub fn with_store(store: Arc<VehicleStore>, config: KernelConfig) -> Self {
        let queue = TaskQueue::new(config.queue_capacity);
        Self {
            store,
            queue,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<VehicleStore> {
        &self.store
    }

    /// Shared submission handle for task producers.
    pub fn sink(&self) -> TaskSinkHandle {
        Arc::new(self.queue.clone())
    }

    /// Enqueues a task. At capacity the incoming task is dropped with a
    /// warning; the caller sees the outcome but no error is raised.
    pub fn add_task(&self, task: Task) -> SubmitOutcome {
        self.queue.submit(task)
    }

    /// Spawns the processor, speed controller and metrics simulator.
    /// No-op if the kernel is already running.
    pub fn start(&self) -> Result<()> {
        let mut workers = self.workers.lock();
        if !workers.is_empty() {
            return Ok(());
        }
        self.stop.store(false, Ordering::Relaxed);

        let cfg = &self.config;

        let queue = self.queue.clone();
        let stop = Arc::clone(&self.stop);
        let (poll, pacing) = (cfg.queue_poll_timeout, cfg.task_pacing);
        workers.push(spawn_worker("task-processor", move || {
            processor_loop(queue, stop, poll, pacing)
        })?);

        let store = Arc::clone(&self.store);
        let stop = Arc::clone(&self.stop);
        let (interval, idle, rates) = (cfg.speed_interval, cfg.idle_sleep, cfg.rates);
        workers.push(spawn_worker("speed-control", move || {
            let mut cadence = Cadence::new(interval);
            while !stop.load(Ordering::Relaxed) {
                if cadence.due(Instant::now()) {
                    store.speed_tick(&rates);
                }
                thread::sleep(idle);
            }
        })?);

        let store = Arc::clone(&self.store);
        let stop = Arc::clone(&self.stop);
        let (interval, idle) = (cfg.metrics_interval, cfg.idle_sleep);
        workers.push(spawn_worker("metrics-sim", move || {
            let mut cadence = Cadence::new(interval);
            while !stop.load(Ordering::Relaxed) {
                if cadence.due(Instant::now()) {
                    store.metrics_tick();
                }
                thread::sleep(idle);
            }
        })?);

        info!("vehicle control kernel started");
        Ok(())
    }

    /// Signals the loops, discards pending tasks, and joins each worker
    /// with a bounded timeout. A worker that misses the deadline is
    /// abandoned with a warning; shutdown proceeds regardless.
    pub fn stop(&self) {
        let mut workers = self.workers.lock();
        if workers.is_empty() {
            return;
        }
        self.stop.store(true, Ordering::Relaxed);

        let dropped = self.queue.drain();
        if dropped > 0 {
            debug!("discarded {dropped} pending tasks on shutdown");
        }

        for worker in workers.drain(..) {
            match worker.done_rx.recv_timeout(self.config.join_timeout) {
                Ok(()) => {
                    let _ = worker.handle.join();
                }
                Err(_) => warn!(
                    "worker {} did not stop within {:?}",
                    worker.name, self.config.join_timeout
                ),
            }
        }

        info!("vehicle control kernel stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.workers.lock().is_empty()
    }

    // Store accessors re-exposed as the kernel's external interface.

    pub fn set_target_speed(&self, speed: f64) {
        self.store.set_target_speed(speed);
    }

    pub fn set_current_speed(&self, speed: f64) {
        self.store.set_current_speed(speed);
    }

    pub fn set_driving_mode(&self, mode: DrivingMode) {
        self.store.set_driving_mode(mode);
    }

    pub fn emergency_brake(&self) {
        self.store.emergency_brake();
    }

    pub fn get_metrics(&self) -> Metrics {
        self.store.get_metrics()
    }

    pub fn set_fuel_level(&self, level: f64) {
        self.store.set_fuel_level(level);
    }

    pub fn state(&self) -> StateSnapshot {
        self.store.state()
    }
}

impl Drop for ControlKernel {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_worker(name: &'static str, body: impl FnOnce() + Send + 'static) -> Result<Worker> {
    let (done_tx, done_rx) = bounded(1);
    let handle = thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            body();
            let _ = done_tx.send(());
        })
        .with_context(|| format!("spawn {name} worker"))?;
    Ok(Worker {
        name,
        handle,
        done_rx,
    })
}
