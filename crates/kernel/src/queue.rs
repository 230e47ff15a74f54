use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::warn;

use hub::{SubmitOutcome, Task, TaskSink};

/// Bounded arrival-order task queue.
///
/// Tasks carry a priority, but pending work is serviced strictly in
/// submission order; producers that need preemption act on the store
/// directly instead of reordering the queue. On overflow the incoming task
/// (the newest) is dropped and reported at warn level.
#[derive(Clone)]
pub struct TaskQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

impl TaskQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx }
    }

    /// Non-blocking enqueue. Never grows the queue past its capacity.
    pub fn submit(&self, task: Task) -> SubmitOutcome {
        match self.tx.try_send(task) {
            Ok(()) => SubmitOutcome::Accepted,
            Err(TrySendError::Full(task)) => {
                warn!("task queue full, dropping task {}", task.name());
                SubmitOutcome::Dropped
            }
            Err(TrySendError::Disconnected(_)) => SubmitOutcome::Closed,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Discards every pending task, returning how many were dropped.
    /// Used on shutdown; drained tasks are never executed.
    pub fn drain(&self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    pub(crate) fn receiver(&self) -> &Receiver<Task> {
        &self.rx
    }
}

impl TaskSink for TaskQueue {
    fn try_submit(&self, task: Task) -> SubmitOutcome {
        self.submit(task)
    }
}
