use crate::error::Error;
use crate::promise::Promise;
use crate::promise::core::settle_with;

/// A runnable unit of work that can be executed by an executor.
///
/// The `Runnable` trait abstracts the callable and the return type of a
/// task, allowing an executor to keep a heterogeneous queue of tasks
/// through `Box<dyn Runnable>`.
///
/// Exactly one of [`run`](Runnable::run) and [`cancel`](Runnable::cancel)
/// is called for every task handed to an executor.
pub trait Runnable: Send {
    /// Executes the task. Called by a worker thread or by a thread pumping
    /// a scheduler.
    fn run(self: Box<Self>);

    /// Discards the task without executing it.
    fn cancel(self: Box<Self>);
}

/// A submitted callable bound to the promise that receives its outcome.
pub(crate) struct Task<F, R> {
    /// The work itself, with its arguments already captured.
    func: F,

    /// Output promise handed back to the submitter.
    promise: Promise<R>,
}

impl<F, R> Task<F, R>
where
    F: FnOnce() -> Result<R, Error> + Send + 'static,
    R: Clone + Send + 'static,
{
    /// Creates a task and the promise that will receive its outcome.
    pub(crate) fn new(func: F) -> (Self, Promise<R>) {
        let promise = Promise::new();

        let task = Self {
            func,
            promise: promise.clone(),
        };

        (task, promise)
    }
}

impl<F, R> Runnable for Task<F, R>
where
    F: FnOnce() -> Result<R, Error> + Send + 'static,
    R: Clone + Send + 'static,
{
    /// Invokes the callable and settles the output promise.
    ///
    /// A panic inside the callable is caught and becomes a rejection; it
    /// never unwinds into the executor loop.
    fn run(self: Box<Self>) {
        let Task { func, promise } = *self;
        settle_with(&promise, func);
    }

    /// Rejects the output promise with [`Error::Cancelled`].
    fn cancel(self: Box<Self>) {
        self.promise.reject(Error::Cancelled);
    }
}
