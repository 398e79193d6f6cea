use super::ExecStatus;
use crate::error::Error;
use crate::runtime::context::{enter_task, next_executor_id, running_here};
use crate::runtime::queue::TaskQueue;
use crate::runtime::task::{Priority, Runnable};

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Mutable executor state, guarded by [`ExecutorCore::state`].
struct State {
    /// Tasks waiting to be run.
    queue: TaskQueue,

    /// Tasks submitted but not yet finished (queued + running).
    active: usize,

    /// Set once at shutdown, never cleared.
    cancelled: bool,

    /// When set, background workers stop dequeuing.
    paused: bool,
}

/// Queue, counters and wake-up signals shared by the worker pool and the
/// scheduler.
///
/// Every access to the state happens under a single lock, and no task or
/// promise continuation ever runs while that lock is held.
pub(crate) struct ExecutorCore {
    /// Identifier used to track which threads are running this
    /// executor's tasks.
    id: usize,

    state: Mutex<State>,

    /// Wakes background workers when work arrives, on resume and at
    /// shutdown.
    work_available: Condvar,

    /// Wakes waiting threads whenever the queue or the active count changes.
    state_changed: Condvar,
}

impl ExecutorCore {
    /// Creates an empty, running executor core.
    pub(crate) fn new() -> Self {
        Self {
            id: next_executor_id(),
            state: Mutex::new(State {
                queue: TaskQueue::new(),
                active: 0,
                cancelled: false,
                paused: false,
            }),
            work_available: Condvar::new(),
            state_changed: Condvar::new(),
        }
    }

    /// Enqueues a task and wakes one worker.
    ///
    /// After shutdown the task is cancelled on the spot instead.
    pub(crate) fn push(&self, priority: Priority, task: Box<dyn Runnable>) {
        let mut state = self.lock();

        if state.cancelled {
            drop(state);

            log::warn!("task submitted after shutdown, cancelling it");
            task.cancel();
            return;
        }

        state.queue.push(priority, task);
        state.active += 1;
        log::trace!("queued task ({} active)", state.active);
        drop(state);

        self.work_available.notify_one();
        self.state_changed.notify_all();
    }

    /// Blocks a background worker until it may run a task.
    ///
    /// Returns `None` once the executor is shutting down.
    pub(crate) fn next_for_worker(&self) -> Option<Box<dyn Runnable>> {
        let mut state = self.lock();

        loop {
            if state.cancelled {
                return None;
            }

            if !state.paused {
                if let Some(task) = state.queue.pop() {
                    return Some(task);
                }
            }

            state = self
                .work_available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Runs a dequeued task and marks it finished.
    ///
    /// A panic escaping the task is logged and swallowed; the task still
    /// counts as finished.
    pub(crate) fn execute(&self, task: Box<dyn Runnable>) {
        let outcome = enter_task(self.id, || {
            panic::catch_unwind(AssertUnwindSafe(|| task.run()))
        });

        if let Err(payload) = outcome {
            log::error!("task panicked outside its promise: {}", Error::from_panic(payload));
        }

        self.finish_one();
    }

    /// Pops and runs at most one task without blocking.
    ///
    /// Ignores the pause flag: pausing only holds back background workers.
    pub(crate) fn run_one(&self) -> (ExecStatus, usize) {
        let task = {
            let mut state = self.lock();

            if state.cancelled {
                return (ExecStatus::Cancelled, 0);
            }

            state.queue.pop()
        };

        match task {
            Some(task) => {
                self.execute(task);
                (ExecStatus::Done, 1)
            }
            None => (ExecStatus::Done, 0),
        }
    }

    /// Blocks until no task is active, the executor shuts down or the
    /// deadline passes.
    ///
    /// With `participate` set, the calling thread runs queued tasks itself
    /// while it waits. The returned count is the number of tasks the caller
    /// ran.
    ///
    /// Tasks of this executor that are running further up the calling
    /// thread's own stack are not waited for.
    pub(crate) fn wait_idle(
        &self,
        deadline: Option<Instant>,
        participate: bool,
    ) -> (ExecStatus, usize) {
        let own = running_here(self.id);
        let mut ran = 0;
        let mut state = self.lock();

        loop {
            if state.cancelled {
                return (ExecStatus::Cancelled, ran);
            }

            if state.active <= own {
                return (ExecStatus::Done, ran);
            }

            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                log::trace!("executor wait timed out with {} active tasks", state.active);
                return (ExecStatus::Timeout, ran);
            }

            if participate {
                if let Some(task) = state.queue.pop() {
                    drop(state);

                    self.execute(task);
                    ran += 1;

                    state = self.lock();
                    continue;
                }
            }

            state = match deadline {
                Some(deadline) => {
                    self.state_changed
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .state_changed
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    pub(crate) fn pause(&self) {
        self.lock().paused = true;
    }

    pub(crate) fn resume(&self) {
        self.lock().paused = false;
        self.work_available.notify_all();
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub(crate) fn active_count(&self) -> usize {
        self.lock().active
    }

    pub(crate) fn queued_count(&self) -> usize {
        self.lock().queue.len()
    }

    /// Shuts the executor down.
    ///
    /// Drains the queue, sets the cancelled flag and wakes every waiting
    /// thread, then rejects every drained task with a cancellation error.
    /// Tasks already running finish normally. Returns the number of
    /// cancelled tasks.
    pub(crate) fn shutdown(&self) -> usize {
        let drained = {
            let mut state = self.lock();

            if state.cancelled {
                return 0;
            }

            let drained = state.queue.drain();
            state.active -= drained.len();
            state.cancelled = true;
            drained
        };

        self.work_available.notify_all();
        self.state_changed.notify_all();

        let count = drained.len();
        for task in drained {
            task.cancel();
        }

        count
    }

    fn finish_one(&self) {
        let mut state = self.lock();
        state.active -= 1;
        drop(state);

        self.state_changed.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
