use crate::error::Error;

/// A continuation invoked with the value of a resolved promise.
pub(crate) type OnResolve<T> = Box<dyn FnOnce(T) + Send>;

/// A continuation invoked with the error of a rejected promise.
pub(crate) type OnReject = Box<dyn FnOnce(Error) + Send>;

/// Observable lifecycle state of a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The promise has not been settled yet.
    Pending,

    /// The promise holds a value.
    ///
    /// Terminal: a resolved promise never changes again.
    Resolved,

    /// The promise holds an error.
    ///
    /// Terminal: a rejected promise never changes again.
    Rejected,
}

/// Outcome of a bounded wait on a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitStatus {
    /// The promise settled before the deadline.
    Ready,

    /// The deadline passed while the promise was still pending.
    Timeout,
}

/// Internal state of a promise cell.
///
/// Continuations are only stored while the cell is pending; settling the
/// cell takes the list out and leaves the value (or error) in its place.
pub(crate) enum State<T> {
    Pending(Vec<(OnResolve<T>, OnReject)>),
    Resolved(T),
    Rejected(Error),
}

impl<T> State<T> {
    pub(crate) fn status(&self) -> Status {
        match self {
            State::Pending(_) => Status::Pending,
            State::Resolved(_) => Status::Resolved,
            State::Rejected(_) => Status::Rejected,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, State::Pending(_))
    }
}
