use super::core::ExecutorCore;
use super::pool::deadline_after;
use super::{ExecStatus, Executor};
use crate::runtime::task::{Priority, Runnable};

use std::time::{Duration, Instant};

/// Cooperative, single-threaded executor.
///
/// A `Scheduler` owns no thread. Submitted tasks sit in its queue until some
/// thread pumps it with one of the `process_*` methods, and then run on that
/// thread. This is how work produced anywhere is marshalled back onto one
/// owner thread, such as an update loop.
///
/// Submission is thread-safe; share the scheduler behind an `Arc` to submit
/// from other threads.
///
/// # Examples
///
/// ```rust
/// use deferrer::{ExecStatus, Executor, Scheduler};
///
/// let scheduler = Scheduler::new();
/// let greeting = scheduler.submit(|| "hello");
///
/// assert!(!greeting.is_settled());
/// assert_eq!(scheduler.process_all_tasks(), (ExecStatus::Done, 1));
/// assert_eq!(greeting.get().unwrap(), "hello");
/// ```
pub struct Scheduler {
    core: ExecutorCore,
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self {
            core: ExecutorCore::new(),
        }
    }

    /// Number of tasks waiting in the queue.
    pub fn queued_count(&self) -> usize {
        self.core.queued_count()
    }

    /// Runs at most one queued task on the calling thread.
    ///
    /// Never blocks; on an empty queue returns `(ExecStatus::Done, 0)`.
    pub fn process_one_task(&self) -> (ExecStatus, usize) {
        self.core.run_one()
    }

    /// Runs tasks until none is left.
    ///
    /// Tasks submitted by the tasks being run are processed too, so the call
    /// returns only once the whole chain of work has settled.
    pub fn process_all_tasks(&self) -> (ExecStatus, usize) {
        self.core.wait_idle(None, true)
    }

    /// Like [`process_all_tasks`](Self::process_all_tasks), stopping after
    /// `timeout`.
    ///
    /// Tasks still queued at that point stay queued.
    pub fn process_tasks_for(&self, timeout: Duration) -> (ExecStatus, usize) {
        self.core.wait_idle(deadline_after(timeout), true)
    }

    /// Like [`process_all_tasks`](Self::process_all_tasks), stopping at
    /// `deadline`.
    pub fn process_tasks_until(&self, deadline: Instant) -> (ExecStatus, usize) {
        self.core.wait_idle(Some(deadline), true)
    }
}

impl Executor for Scheduler {
    fn schedule(&self, priority: Priority, task: Box<dyn Runnable>) {
        self.core.push(priority, task);
    }

    fn drain_one(&self) -> usize {
        self.core.run_one().1
    }

    fn active_count(&self) -> usize {
        self.core.active_count()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    /// Cancels every task that has not run yet.
    fn drop(&mut self) {
        let cancelled = self.core.shutdown();
        log::debug!("scheduler shutting down, {cancelled} queued tasks cancelled");
    }
}
