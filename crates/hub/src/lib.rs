//! Shared task vocabulary for the vehicle control kernel.
//!
//! Producers (safety features, infotainment, UI) describe work as [`Task`]
//! values and hand them to a [`TaskSink`]; the kernel's processor executes
//! each task exactly once. Task actions are explicit context structs
//! implementing [`TaskAction`], so every piece of state an action touches is
//! visible in its type rather than hidden in a closure capture.

use std::fmt;

use thiserror::Error;

pub type TaskResult = Result<(), TaskError>;

/// Failure surface returned by task actions.
///
/// Actions report failure as a value; the processor logs it and moves on.
/// Nothing here crosses the task boundary as a panic.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task failed: {0}")]
    Failed(String),
}

impl TaskError {
    pub fn failed(msg: impl Into<String>) -> Self {
        TaskError::Failed(msg.into())
    }
}

/// Urgency attached to a task by its producer.
///
/// Lower index is more urgent. The queue itself preserves arrival order;
/// priority is informational and drives producer-side decisions (emergency
/// paths act on the store directly rather than waiting behind queued work).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    Emergency,
    High,
    Normal,
}

impl TaskPriority {
    pub fn index(self) -> usize {
        match self {
            TaskPriority::Emergency => 0,
            TaskPriority::High => 1,
            TaskPriority::Normal => 2,
        }
    }
}

/// One-shot unit of work carried by a [`Task`].
pub trait TaskAction: Send {
    fn run(&mut self) -> TaskResult;
}

// A bare closure is still convenient for simple callers and tests.
impl<F> TaskAction for F
where
    F: FnMut() -> TaskResult + Send,
{
    fn run(&mut self) -> TaskResult {
        self()
    }
}

/// Named, prioritized, one-shot unit of work.
///
/// Immutable once created: enqueued by a producer, executed exactly once by
/// the processor, then discarded. Never requeued or retried.
pub struct Task {
    name: String,
    priority: TaskPriority,
    action: Box<dyn TaskAction>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        priority: TaskPriority,
        action: impl TaskAction + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Executes the action. Called once by the processor; the task is
    /// consumed by value so it cannot run twice.
    pub fn run(mut self) -> TaskResult {
        self.action.run()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Outcome of a non-blocking task submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Task accepted into the queue.
    Accepted,
    /// Queue at capacity; the incoming task was dropped.
    Dropped,
    /// Consumer is gone; the kernel is stopped or stopping.
    Closed,
}

/// Submission contract exposed by the kernel to task producers.
pub trait TaskSink: Send + Sync {
    fn try_submit(&self, task: Task) -> SubmitOutcome;
}

pub type TaskSinkHandle = std::sync::Arc<dyn TaskSink>;
