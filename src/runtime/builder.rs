use crate::runtime::executor::pool::WorkerPool;

use std::io;
use std::thread;

/// Default name prefix of worker threads.
const DEFAULT_THREAD_NAME: &str = "deferrer-worker";

/// Builder for configuring and creating a [`WorkerPool`].
///
/// # Examples
///
/// ```rust
/// use deferrer::WorkerPoolBuilder;
///
/// let pool = WorkerPoolBuilder::new()
///     .worker_threads(2)
///     .thread_name("loader")
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.worker_threads(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct WorkerPoolBuilder {
    /// Number of worker threads in the pool.
    worker_threads: usize,

    /// Prefix of worker thread names.
    thread_name: String,
}

impl WorkerPoolBuilder {
    /// Creates a new `WorkerPoolBuilder` with default configuration.
    ///
    /// By default, the number of worker threads is set to the number
    /// of available logical CPUs, falling back to `1` if unavailable.
    pub fn new() -> Self {
        let worker_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            worker_threads,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }

    /// Sets the number of worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn worker_threads(mut self, n: usize) -> Self {
        assert!(n > 0, "worker_threads must be > 0");

        self.worker_threads = n;
        self
    }

    /// Sets the name prefix of worker threads.
    ///
    /// Threads are named `"{prefix}-{index}"`.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Spawns the worker threads and returns the pool.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned. Workers
    /// spawned before the failure are shut down and joined first.
    pub fn build(self) -> io::Result<WorkerPool> {
        WorkerPool::spawn(self.worker_threads, &self.thread_name)
    }
}

impl Default for WorkerPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
