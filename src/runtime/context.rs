use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of executor identifiers.
static NEXT_EXECUTOR_ID: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    /// Identifiers of the executors whose tasks are currently running on
    /// this thread, innermost last.
    ///
    /// A thread may appear several times for the same executor when a task
    /// pumps its own executor (e.g. a scheduler task calling
    /// `process_all_tasks`).
    static RUNNING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Allocates a fresh executor identifier.
pub(crate) fn next_executor_id() -> usize {
    NEXT_EXECUTOR_ID.fetch_add(1, Ordering::Relaxed)
}

/// Pops its executor from `RUNNING` when dropped, so the entry is removed
/// even if the task unwinds.
struct TaskGuard {
    executor: usize,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        RUNNING.with(|running| {
            let mut running = running.borrow_mut();
            if let Some(pos) = running.iter().rposition(|id| *id == self.executor) {
                running.remove(pos);
            }
        });
    }
}

/// Runs `f` while recording that a task of `executor` is executing on the
/// current thread.
pub(crate) fn enter_task<R>(executor: usize, f: impl FnOnce() -> R) -> R {
    RUNNING.with(|running| running.borrow_mut().push(executor));
    let _guard = TaskGuard { executor };

    f()
}

/// Number of tasks of `executor` currently on this thread's stack.
pub(crate) fn running_here(executor: usize) -> usize {
    RUNNING.with(|running| running.borrow().iter().filter(|id| **id == executor).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_entry_removed_when_task_unwinds() {
        let executor = next_executor_id();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            enter_task(executor, || {
                assert_eq!(running_here(executor), 1);
                panic!("unwinding task");
            })
        }));

        assert!(outcome.is_err());
        assert_eq!(running_here(executor), 0);
    }

    #[test]
    fn test_nested_entries_are_counted() {
        let executor = next_executor_id();

        let depth = enter_task(executor, || enter_task(executor, || running_here(executor)));

        assert_eq!(depth, 2);
        assert_eq!(running_here(executor), 0);
    }
}
