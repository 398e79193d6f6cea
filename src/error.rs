use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

/// The rejection reason carried by a [`Promise`](crate::Promise).
///
/// Errors are cheap to clone so that a single rejection can be handed to
/// every continuation registered on a promise and re-raised by every call
/// to [`get`](crate::Promise::get).
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The task was discarded without ever running.
    ///
    /// Delivered when an executor shuts down with work still queued, or when
    /// work is submitted to an executor that has already shut down.
    #[error("task was cancelled before it could run")]
    Cancelled,

    /// The callable or continuation panicked.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// An error returned by a fallible callable.
    #[error("{0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),

    /// An ad-hoc rejection reason.
    #[error("{0}")]
    Message(String),

    /// [`any`](crate::any) was called without any promise to wait on.
    #[error("`any` requires at least one promise")]
    EmptyInput,
}

impl Error {
    /// Wraps an arbitrary error as a rejection reason.
    ///
    /// Passing an [`Error`] through here returns it unchanged, so errors
    /// propagated with `?` out of a nested [`get`](crate::Promise::get)
    /// keep their original variant.
    pub fn custom<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(error);

        match boxed.downcast::<Error>() {
            Ok(inner) => *inner,
            Err(other) => Error::Failed(Arc::from(other)),
        }
    }

    /// Builds a rejection reason from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Message(message.into())
    }

    /// Returns `true` if the task never ran.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Returns the wrapped error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Failed(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Converts a panic payload caught by `catch_unwind`.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Error::Panicked(message)
    }
}
