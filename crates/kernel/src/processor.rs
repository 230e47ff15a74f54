use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use log::{debug, error};

use crate::queue::TaskQueue;

/// Single consuming loop over the task queue.
///
/// Blocks on the queue with a short timeout so the stop flag is observed
/// promptly when idle. Each task runs at most once; a failure is logged and
/// the task discarded, never retried. A fixed pacing sleep after every
/// execution bounds throughput so task storms cannot starve the periodic
/// loops.
pub(crate) fn processor_loop(
    queue: TaskQueue,
    stop: Arc<AtomicBool>,
    poll_timeout: Duration,
    pacing: Duration,
) {
    while !stop.load(Ordering::Relaxed) {
        match queue.receiver().recv_timeout(poll_timeout) {
            Ok(task) => {
                let name = task.name().to_owned();
                debug!("executing task {name}");
                if let Err(err) = task.run() {
                    error!("task {name} failed: {err}");
                }
                thread::sleep(pacing);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub::{Task, TaskError, TaskPriority};
    use parking_lot::Mutex;

    fn run_until_empty(queue: &TaskQueue) {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let consumer = queue.clone();
        let handle = thread::spawn(move || {
            processor_loop(
                consumer,
                flag,
                Duration::from_millis(5),
                Duration::from_millis(1),
            )
        });
        while !queue.is_empty() {
            thread::yield_now();
        }
        // Let the in-flight task finish before signalling stop.
        thread::sleep(Duration::from_millis(20));
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();
    }

    #[test]
    fn executes_tasks_in_arrival_order() {
        let queue = TaskQueue::new(8);
        let order: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

        // Priorities deliberately inverted: arrival order must still win.
        for (id, priority) in [
            (0, TaskPriority::Normal),
            (1, TaskPriority::Emergency),
            (2, TaskPriority::High),
        ] {
            let order = Arc::clone(&order);
            queue.submit(Task::new(format!("task-{id}"), priority, move || {
                order.lock().push(id);
                Ok(())
            }));
        }

        run_until_empty(&queue);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn a_failing_task_does_not_stop_the_loop() {
        let queue = TaskQueue::new(8);
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        queue.submit(Task::new("failing", TaskPriority::High, || {
            Err(TaskError::failed("injected"))
        }));
        let after = Arc::clone(&order);
        queue.submit(Task::new("after-failure", TaskPriority::Normal, move || {
            after.lock().push("ran");
            Ok(())
        }));

        run_until_empty(&queue);
        assert_eq!(*order.lock(), vec!["ran"]);
    }
}
