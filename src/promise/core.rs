use super::state::{OnReject, OnResolve, State, Status, WaitStatus};
use crate::error::Error;

use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// The cell shared by every handle to the same promise.
pub(crate) struct Shared<T> {
    /// Settlement state and pending continuations.
    state: Mutex<State<T>>,

    /// Wakes threads blocked in `wait*` or `get`.
    settled: Condvar,
}

/// A value that will exist later.
///
/// A `Promise` is a cheap, clonable handle to a shared single-assignment
/// cell. The cell starts out pending and is settled exactly once, either
/// resolved with a value or rejected with an [`Error`]. Any later attempt to
/// settle it is ignored and reported as `false`.
///
/// Two handles compare equal when they refer to the same cell.
///
/// # Examples
///
/// ```rust
/// use deferrer::Promise;
///
/// let promise = Promise::new();
/// let doubled = promise.then(|v: i32| v * 2);
///
/// assert!(promise.resolve(21));
/// assert!(!promise.resolve(0));
/// assert_eq!(doubled.get().unwrap(), 42);
/// ```
pub struct Promise<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Promise<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a pending promise.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::Pending(Vec::new())),
                settled: Condvar::new(),
            }),
        }
    }

    /// Creates a promise already resolved with `value`.
    pub fn resolved(value: T) -> Self {
        let promise = Self::new();
        promise.resolve(value);
        promise
    }

    /// Creates a promise already rejected with `error`.
    pub fn rejected(error: Error) -> Self {
        let promise = Self::new();
        promise.reject(error);
        promise
    }

    /// Resolves the promise with `value`.
    ///
    /// Returns `false` without touching the stored outcome if the promise was
    /// already settled. Otherwise every registered continuation runs on the
    /// calling thread, in registration order, before blocked waiters are
    /// woken.
    pub fn resolve(&self, value: T) -> bool {
        let waiters = {
            let mut state = self.lock();

            if !state.is_pending() {
                return false;
            }

            match mem::replace(&mut *state, State::Resolved(value.clone())) {
                State::Pending(waiters) => waiters,
                _ => Vec::new(),
            }
        };

        for (on_resolve, _) in waiters {
            on_resolve(value.clone());
        }

        self.shared.settled.notify_all();
        true
    }

    /// Rejects the promise with `error`.
    ///
    /// Symmetric to [`resolve`](Self::resolve).
    pub fn reject(&self, error: Error) -> bool {
        let waiters = {
            let mut state = self.lock();

            if !state.is_pending() {
                return false;
            }

            match mem::replace(&mut *state, State::Rejected(error.clone())) {
                State::Pending(waiters) => waiters,
                _ => Vec::new(),
            }
        };

        for (_, on_reject) in waiters {
            on_reject(error.clone());
        }

        self.shared.settled.notify_all();
        true
    }

    /// Settles the promise from a result.
    pub fn settle(&self, result: Result<T, Error>) -> bool {
        match result {
            Ok(value) => self.resolve(value),
            Err(error) => self.reject(error),
        }
    }

    /// Returns the current status without blocking.
    pub fn status(&self) -> Status {
        self.lock().status()
    }

    /// Returns `true` once the promise is resolved or rejected.
    pub fn is_settled(&self) -> bool {
        !self.lock().is_pending()
    }

    /// Blocks until the promise settles, then returns its value or error.
    pub fn get(&self) -> Result<T, Error> {
        let state = self.wait_settled();

        match &*state {
            State::Resolved(value) => Ok(value.clone()),
            State::Rejected(error) => Err(error.clone()),
            State::Pending(_) => unreachable!("wait_settled returned while pending"),
        }
    }

    /// Blocks until the promise settles and returns its value, or `default`
    /// if it was rejected.
    pub fn get_or_default(&self, default: T) -> T {
        self.get().unwrap_or(default)
    }

    /// Blocks until the promise settles.
    pub fn wait(&self) {
        drop(self.wait_settled());
    }

    /// Blocks until the promise settles or `timeout` elapses.
    pub fn wait_for(&self, timeout: Duration) -> WaitStatus {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_until(deadline),
            None => {
                self.wait();
                WaitStatus::Ready
            }
        }
    }

    /// Blocks until the promise settles or `deadline` passes.
    pub fn wait_until(&self, deadline: Instant) -> WaitStatus {
        let mut state = self.lock();

        while state.is_pending() {
            let now = Instant::now();
            if now >= deadline {
                log::trace!("promise wait timed out");
                return WaitStatus::Timeout;
            }

            state = self
                .shared
                .settled
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        WaitStatus::Ready
    }

    /// Registers a pair of continuations.
    ///
    /// If the promise is already settled the matching continuation runs
    /// immediately on the calling thread; otherwise it runs on whichever
    /// thread settles the promise. Exactly one of the two is ever invoked.
    pub(crate) fn subscribe<R, E>(&self, on_resolve: R, on_reject: E)
    where
        R: FnOnce(T) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let outcome = {
            let mut state = self.lock();

            match &mut *state {
                State::Pending(waiters) => {
                    let on_resolve: OnResolve<T> = Box::new(on_resolve);
                    let on_reject: OnReject = Box::new(on_reject);

                    waiters.push((on_resolve, on_reject));
                    return;
                }
                State::Resolved(value) => Ok(value.clone()),
                State::Rejected(error) => Err(error.clone()),
            }
        };

        match outcome {
            Ok(value) => on_resolve(value),
            Err(error) => on_reject(error),
        }
    }

    /// Settles this promise with whatever `source` settles with.
    pub(crate) fn follow(&self, source: &Promise<T>) {
        let on_value = self.clone();
        let on_error = self.clone();

        source.subscribe(
            move |value| {
                on_value.resolve(value);
            },
            move |error| {
                on_error.reject(error);
            },
        );
    }

    fn wait_settled(&self) -> MutexGuard<'_, State<T>> {
        let mut state = self.lock();

        while state.is_pending() {
            state = self
                .shared
                .settled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        state
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs `f`, turning a panic into a rejection, and settles `promise` with
/// the outcome.
pub(crate) fn settle_with<T, F>(promise: &Promise<T>, f: F) -> bool
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Result<T, Error>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(Error::from_panic(payload)));

    promise.settle(result)
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> PartialEq for Promise<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T> Eq for Promise<T> {}

impl<T> Default for Promise<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status();

        f.debug_struct("Promise").field("status", &status).finish()
    }
}

/// Creates a promise already resolved with `value`.
pub fn resolved<T>(value: T) -> Promise<T>
where
    T: Clone + Send + 'static,
{
    Promise::resolved(value)
}

/// Creates a promise already rejected with `error`.
pub fn rejected<T>(error: Error) -> Promise<T>
where
    T: Clone + Send + 'static,
{
    Promise::rejected(error)
}
