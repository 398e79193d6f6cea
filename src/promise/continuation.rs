use super::core::{Promise, settle_with};
use crate::error::Error;

use std::panic::{self, AssertUnwindSafe};

impl<T> Promise<T>
where
    T: Clone + Send + 'static,
{
    /// Chains a continuation that transforms the resolved value.
    ///
    /// A rejection passes through to the returned promise untouched. If
    /// `on_resolve` panics, the returned promise is rejected with
    /// [`Error::Panicked`].
    ///
    /// The continuation runs immediately if this promise is already
    /// settled, otherwise on the thread that settles it.
    pub fn then<R, F>(&self, on_resolve: F) -> Promise<R>
    where
        R: Clone + Send + 'static,
        F: FnOnce(T) -> R + Send + 'static,
    {
        let next = Promise::new();
        let on_value = next.clone();
        let on_error = next.clone();

        self.subscribe(
            move |value| {
                settle_with(&on_value, move || Ok(on_resolve(value)));
            },
            move |error| {
                on_error.reject(error);
            },
        );

        next
    }

    /// Chains a pair of continuations.
    ///
    /// A rejection is handed to `on_reject`, whose return value resolves the
    /// returned promise. This is how a failed chain recovers.
    pub fn then_or_else<R, F, G>(&self, on_resolve: F, on_reject: G) -> Promise<R>
    where
        R: Clone + Send + 'static,
        F: FnOnce(T) -> R + Send + 'static,
        G: FnOnce(Error) -> R + Send + 'static,
    {
        let next = Promise::new();
        let on_value = next.clone();
        let on_error = next.clone();

        self.subscribe(
            move |value| {
                settle_with(&on_value, move || Ok(on_resolve(value)));
            },
            move |error| {
                settle_with(&on_error, move || Ok(on_reject(error)));
            },
        );

        next
    }

    /// Recovers from a rejection; resolved values pass through unchanged.
    pub fn except<G>(&self, on_reject: G) -> Promise<T>
    where
        G: FnOnce(Error) -> T + Send + 'static,
    {
        self.then_or_else(|value| value, on_reject)
    }

    /// Chains a continuation that itself returns a promise.
    ///
    /// The returned promise settles when the inner promise does, so nested
    /// `Promise<Promise<R>>` never reaches the caller.
    pub fn and_then<R, F>(&self, on_resolve: F) -> Promise<R>
    where
        R: Clone + Send + 'static,
        F: FnOnce(T) -> Promise<R> + Send + 'static,
    {
        let next = Promise::new();
        let on_value = next.clone();
        let on_error = next.clone();

        self.subscribe(
            move |value| match panic::catch_unwind(AssertUnwindSafe(move || on_resolve(value))) {
                Ok(inner) => on_value.follow(&inner),
                Err(payload) => {
                    on_value.reject(Error::from_panic(payload));
                }
            },
            move |error| {
                on_error.reject(error);
            },
        );

        next
    }
}
