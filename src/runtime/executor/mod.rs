//! Task executors.
//!
//! This module contains the two executors and the contract they share:
//! - `core`: queue, counters and wake-up logic common to both,
//! - `worker`: the loop run by each background thread,
//! - `pool`: a fixed set of background threads draining the queue,
//! - `scheduler`: the same queue with no thread of its own, drained only
//!   when a caller pumps it.
//!
//! Both implement [`Executor`], so code that only needs to hand off work
//! can be written once against either of them.

pub(crate) mod core;
pub(crate) mod pool;
pub(crate) mod scheduler;
pub(crate) mod worker;

use crate::error::Error;
use crate::promise::Promise;
use crate::runtime::task::{Priority, Runnable, Task};

/// Outcome of a blocking or pumping call on an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecStatus {
    /// The requested work was done: the queue was polled, or every active
    /// task finished.
    Done,

    /// The deadline passed first.
    Timeout,

    /// The executor has shut down.
    Cancelled,
}

/// Anything that accepts tasks and eventually runs them.
///
/// Implementors only provide the queueing primitives; submission of
/// closures is built on top of [`schedule`](Executor::schedule).
///
/// # Examples
///
/// ```rust
/// use deferrer::{Executor, Priority, Scheduler};
///
/// let scheduler = Scheduler::new();
/// let answer = scheduler.submit_with_priority(Priority::High, || 6 * 7);
///
/// scheduler.process_all_tasks();
/// assert_eq!(answer.get().unwrap(), 42);
/// ```
pub trait Executor {
    /// Enqueues a type-erased task.
    fn schedule(&self, priority: Priority, task: Box<dyn Runnable>);

    /// Runs at most one queued task on the calling thread without blocking.
    ///
    /// Returns the number of tasks run.
    fn drain_one(&self) -> usize;

    /// Number of tasks submitted but not yet finished.
    fn active_count(&self) -> usize;

    /// Submits `func` with [`Priority::Normal`].
    fn submit<F, R>(&self, func: F) -> Promise<R>
    where
        Self: Sized,
        F: FnOnce() -> R + Send + 'static,
        R: Clone + Send + 'static,
    {
        self.submit_with_priority(Priority::default(), func)
    }

    /// Submits `func` and returns the promise of its result immediately.
    ///
    /// A panic inside `func` rejects the promise with
    /// [`Error::Panicked`].
    fn submit_with_priority<F, R>(&self, priority: Priority, func: F) -> Promise<R>
    where
        Self: Sized,
        F: FnOnce() -> R + Send + 'static,
        R: Clone + Send + 'static,
    {
        let (task, promise) = Task::new(move || Ok(func()));
        self.schedule(priority, Box::new(task));
        promise
    }

    /// Submits a fallible `func` with [`Priority::Normal`].
    fn try_submit<F, R, E>(&self, func: F) -> Promise<R>
    where
        Self: Sized,
        F: FnOnce() -> Result<R, E> + Send + 'static,
        R: Clone + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.try_submit_with_priority(Priority::default(), func)
    }

    /// Submits a fallible `func`; an `Err` rejects the promise.
    fn try_submit_with_priority<F, R, E>(&self, priority: Priority, func: F) -> Promise<R>
    where
        Self: Sized,
        F: FnOnce() -> Result<R, E> + Send + 'static,
        R: Clone + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let (task, promise) = Task::new(move || func().map_err(Error::custom));
        self.schedule(priority, Box::new(task));
        promise
    }
}
