use crate::error::Error;
use crate::promise::Promise;
use crate::runtime::executor::pool::WorkerPool;
use crate::runtime::executor::scheduler::Scheduler;
use crate::runtime::executor::{ExecStatus, Executor};
use crate::runtime::task::Priority;

use std::io;
use std::thread::{self, ThreadId};
use std::time::Duration;

/// How long [`Deferrer::active_safe_wait_promise`] parks on the promise when
/// neither executor had work to run.
const IDLE_SLICE: Duration = Duration::from_millis(1);

/// Moves work between one owner thread and a pool of background threads.
///
/// A `Deferrer` pairs a [`Scheduler`], drained by the thread that created the
/// deferrer (the owner, typically an update or render loop), with a
/// [`WorkerPool`] for everything that may run anywhere. Background work
/// marshals its results back onto the owner thread by submitting to the
/// scheduler; share the deferrer behind an `Arc` to make that possible.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use deferrer::Deferrer;
///
/// let deferrer = Arc::new(Deferrer::new(2).unwrap());
///
/// let handle = deferrer.clone();
/// let loaded = deferrer
///     .do_in_worker_thread(|| vec![1u8, 2, 3])
///     .and_then(move |bytes| handle.do_in_main_thread(move || bytes.len()));
///
/// assert_eq!(deferrer.active_safe_wait_promise(&loaded).unwrap(), 3);
/// ```
pub struct Deferrer {
    /// Executor pumped by the owner thread.
    scheduler: Scheduler,

    /// Background executor.
    pool: WorkerPool,

    /// Thread allowed to pump the scheduler.
    owner: ThreadId,
}

impl Deferrer {
    /// Creates a deferrer owned by the calling thread, with a pool of
    /// `worker_threads` threads.
    ///
    /// # Panics
    ///
    /// Panics if `worker_threads == 0`.
    pub fn new(worker_threads: usize) -> io::Result<Self> {
        Ok(Self::with_pool(WorkerPool::new(worker_threads)?))
    }

    /// Creates a deferrer owned by the calling thread around an existing
    /// pool.
    pub fn with_pool(pool: WorkerPool) -> Self {
        Self {
            scheduler: Scheduler::new(),
            pool,
            owner: thread::current().id(),
        }
    }

    /// Runs `func` on the owner thread, the next time it pumps.
    pub fn do_in_main_thread<F, R>(&self, func: F) -> Promise<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Clone + Send + 'static,
    {
        self.scheduler.submit(func)
    }

    /// Like [`do_in_main_thread`](Self::do_in_main_thread), queued at
    /// `priority`.
    pub fn do_in_main_thread_with_priority<F, R>(
        &self,
        priority: Priority,
        func: F,
    ) -> Promise<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Clone + Send + 'static,
    {
        self.scheduler.submit_with_priority(priority, func)
    }

    /// Runs `func` on a background worker.
    pub fn do_in_worker_thread<F, R>(&self, func: F) -> Promise<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Clone + Send + 'static,
    {
        self.pool.submit(func)
    }

    /// Like [`do_in_worker_thread`](Self::do_in_worker_thread), queued at
    /// `priority`.
    pub fn do_in_worker_thread_with_priority<F, R>(
        &self,
        priority: Priority,
        func: F,
    ) -> Promise<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Clone + Send + 'static,
    {
        self.pool.submit_with_priority(priority, func)
    }

    /// Waits for `promise` from the owner thread without starving either
    /// executor.
    ///
    /// While the promise is pending, the owner alternately runs one
    /// scheduler task and one pool task, so a promise that depends on work
    /// queued on either side still settles. When both queues are empty it
    /// parks on the promise briefly instead of spinning.
    ///
    /// # Panics
    ///
    /// Panics if called from any thread other than the owner.
    pub fn active_safe_wait_promise<T>(&self, promise: &Promise<T>) -> Result<T, Error>
    where
        T: Clone + Send + 'static,
    {
        assert_eq!(
            thread::current().id(),
            self.owner,
            "active_safe_wait_promise must be called from the deferrer's owner thread"
        );

        while !promise.is_settled() {
            let main = self.scheduler.drain_one();

            if promise.is_settled() {
                break;
            }

            let worker = self.pool.drain_one();

            if main + worker == 0 {
                promise.wait_for(IDLE_SLICE);
            }
        }

        promise.get()
    }

    /// Runs every task queued for the owner thread.
    ///
    /// Meant to be called once per iteration of the owner's loop.
    pub fn update(&self) -> (ExecStatus, usize) {
        self.scheduler.process_all_tasks()
    }

    /// The executor pumped by the owner thread.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The background executor.
    pub fn worker_pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Returns `true` when called from the owner thread.
    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }
}
