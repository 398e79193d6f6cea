use super::core::ExecutorCore;

use std::sync::Arc;

/// A background thread of a [`WorkerPool`](crate::WorkerPool).
///
/// Workers share a single priority queue. The execution loop is:
/// 1. Wait until work is available and the pool is not paused
/// 2. Pop the highest-priority task
/// 3. Run it with the queue unlocked
/// 4. Mark it finished and start over
///
/// The loop ends when the pool shuts down.
pub(crate) struct Worker {
    /// Index of the worker within its pool.
    id: usize,

    /// State shared with the pool and all other workers.
    core: Arc<ExecutorCore>,
}

impl Worker {
    pub(crate) fn new(id: usize, core: Arc<ExecutorCore>) -> Self {
        Self { id, core }
    }

    /// Runs the worker loop until shutdown.
    pub(crate) fn run(&self) {
        while let Some(task) = self.core.next_for_worker() {
            self.core.execute(task);
        }

        log::debug!("worker {} exiting", self.id);
    }
}
