use super::core::ExecutorCore;
use super::worker::Worker;
use super::{ExecStatus, Executor};
use crate::runtime::builder::WorkerPoolBuilder;
use crate::runtime::task::{Priority, Runnable};

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Multi-threaded background executor.
///
/// The `WorkerPool` is responsible for:
/// - spawning a fixed set of worker threads at construction,
/// - dispatching submitted tasks to them in priority order,
/// - letting callers wait for the queue to drain, passively or by helping,
/// - cancelling unstarted work and joining its threads when dropped.
///
/// # Examples
///
/// ```rust
/// use deferrer::{Executor, WorkerPool};
///
/// let pool = WorkerPool::new(2).unwrap();
/// let answer = pool.submit(|| 42);
///
/// assert_eq!(answer.get().unwrap(), 42);
/// ```
pub struct WorkerPool {
    /// Queue and counters shared with every worker.
    core: Arc<ExecutorCore>,

    /// Join handles for worker threads.
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Creates a pool with `worker_threads` threads and default settings.
    ///
    /// # Panics
    ///
    /// Panics if `worker_threads == 0`.
    pub fn new(worker_threads: usize) -> io::Result<Self> {
        WorkerPoolBuilder::new().worker_threads(worker_threads).build()
    }

    /// Returns a builder to configure a pool.
    pub fn builder() -> WorkerPoolBuilder {
        WorkerPoolBuilder::new()
    }

    /// Spawns the worker threads.
    ///
    /// If a spawn fails, the partially built pool is dropped, which shuts
    /// down and joins the threads spawned so far.
    pub(crate) fn spawn(threads: usize, name: &str) -> io::Result<Self> {
        let mut pool = Self {
            core: Arc::new(ExecutorCore::new()),
            handles: Vec::with_capacity(threads),
        };

        for id in 0..threads {
            let worker = Worker::new(id, pool.core.clone());

            let handle = thread::Builder::new()
                .name(format!("{name}-{id}"))
                .spawn(move || worker.run())?;

            pool.handles.push(handle);
        }

        log::debug!("worker pool started with {threads} threads");
        Ok(pool)
    }

    /// Number of worker threads owned by the pool.
    pub fn worker_threads(&self) -> usize {
        self.handles.len()
    }

    /// Number of tasks waiting in the queue.
    pub fn queued_count(&self) -> usize {
        self.core.queued_count()
    }

    /// Stops workers from dequeuing new tasks.
    ///
    /// Tasks already running finish normally.
    pub fn pause(&self) {
        self.core.pause();
    }

    /// Lets workers dequeue tasks again.
    pub fn resume(&self) {
        self.core.resume();
    }

    /// Returns `true` while background workers are held back.
    pub fn is_paused(&self) -> bool {
        self.core.is_paused()
    }

    /// Blocks until every submitted task has finished.
    ///
    /// The calling thread does no work itself, so it must not be the one
    /// expected to produce that work; use
    /// [`active_wait_all`](Self::active_wait_all) instead in that case.
    pub fn wait_all(&self) -> ExecStatus {
        self.core.wait_idle(None, false).0
    }

    /// Like [`wait_all`](Self::wait_all), giving up after `timeout`.
    pub fn wait_all_for(&self, timeout: Duration) -> ExecStatus {
        self.core.wait_idle(deadline_after(timeout), false).0
    }

    /// Like [`wait_all`](Self::wait_all), giving up at `deadline`.
    pub fn wait_all_until(&self, deadline: Instant) -> ExecStatus {
        self.core.wait_idle(Some(deadline), false).0
    }

    /// Blocks until every submitted task has finished, running queued
    /// tasks on the calling thread in the meantime.
    ///
    /// Returns the number of tasks the caller ran. Queued tasks are taken
    /// even while the pool is paused.
    pub fn active_wait_all(&self) -> (ExecStatus, usize) {
        self.core.wait_idle(None, true)
    }

    /// Runs at most one queued task on the calling thread without blocking.
    pub fn active_wait_one(&self) -> (ExecStatus, usize) {
        self.core.run_one()
    }

    /// Like [`active_wait_all`](Self::active_wait_all), giving up after
    /// `timeout`.
    pub fn active_wait_all_for(&self, timeout: Duration) -> (ExecStatus, usize) {
        self.core.wait_idle(deadline_after(timeout), true)
    }

    /// Like [`active_wait_all`](Self::active_wait_all), giving up at
    /// `deadline`.
    pub fn active_wait_all_until(&self, deadline: Instant) -> (ExecStatus, usize) {
        self.core.wait_idle(Some(deadline), true)
    }
}

impl Executor for WorkerPool {
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

impl Drop for WorkerPool {
    /// Shuts down the pool.
    ///
    /// This performs the following steps:
    /// 1. Cancels every task that has not started yet
    /// 2. Signals the workers to exit
    /// 3. Joins all worker threads
    ///
    /// A pool dropped from one of its own workers cannot join that thread;
    /// it is detached instead.
    fn drop(&mut self) {
        let cancelled = self.core.shutdown();
        log::debug!("worker pool shutting down, {cancelled} queued tasks cancelled");

        let current = thread::current().id();

        for handle in self.handles.drain(..) {
            if handle.thread().id() == current {
                log::warn!("worker pool dropped from its own worker thread, detaching it");
                continue;
            }

            let _ = handle.join();
        }
    }
}

/// Converts a timeout into a deadline; `None` means wait forever.
pub(crate) fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
