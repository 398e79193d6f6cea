use super::core::Promise;
use crate::error::Error;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Waits for every promise to resolve.
///
/// The returned promise resolves with the values in input order, whatever
/// order the inputs settle in. It rejects as soon as any input rejects,
/// with that input's error; the outcomes of the remaining inputs are
/// discarded. An empty input resolves immediately with an empty vector.
///
/// # Examples
///
/// ```rust
/// use deferrer::{Promise, all};
///
/// let a = Promise::new();
/// let b = Promise::new();
/// let both = all([a.clone(), b.clone()]);
///
/// b.resolve(2);
/// a.resolve(1);
/// assert_eq!(both.get().unwrap(), vec![1, 2]);
/// ```
pub fn all<T, I>(promises: I) -> Promise<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let promises: Vec<Promise<T>> = promises.into_iter().collect();
    let combined = Promise::new();

    if promises.is_empty() {
        combined.resolve(Vec::new());
        return combined;
    }

    let slots: Arc<Mutex<Vec<Option<T>>>> = Arc::new(Mutex::new(vec![None; promises.len()]));
    let remaining = Arc::new(AtomicUsize::new(promises.len()));

    for (index, promise) in promises.iter().enumerate() {
        let on_value = combined.clone();
        let on_error = combined.clone();
        let slots = slots.clone();
        let remaining = remaining.clone();

        promise.subscribe(
            move |value| {
                slots.lock().unwrap_or_else(PoisonError::into_inner)[index] = Some(value);

                if remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
                    return;
                }

                let values = slots
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .iter_mut()
                    .map(Option::take)
                    .collect::<Option<Vec<T>>>();

                if let Some(values) = values {
                    on_value.resolve(values);
                }
            },
            move |error| {
                on_error.reject(error);
            },
        );
    }

    combined
}

/// Settles with whichever promise settles first.
///
/// The first settlement of any kind wins, resolution or rejection; inputs
/// settling afterwards have no effect on the returned promise.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] if `promises` is empty, since there would
/// be nothing to wait for.
pub fn any<T, I>(promises: I) -> Result<Promise<T>, Error>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let promises: Vec<Promise<T>> = promises.into_iter().collect();

    if promises.is_empty() {
        return Err(Error::EmptyInput);
    }

    let first = Promise::new();

    for promise in &promises {
        first.follow(promise);
    }

    Ok(first)
}

/// A fixed-size tuple of promises that can be joined into one promise of a
/// tuple of values.
///
/// Implemented for tuples of one to eight promises. See [`tuple`].
pub trait PromiseTuple {
    /// The tuple of resolved values.
    type Output: Clone + Send + 'static;

    /// Joins the promises; see [`tuple`].
    fn join(self) -> Promise<Self::Output>;
}

/// Waits for a heterogeneous, fixed set of promises.
///
/// Same ordering and first-failure semantics as [`all`], with one value
/// type per position.
///
/// # Examples
///
/// ```rust
/// use deferrer::{resolved, tuple};
///
/// let joined = tuple((resolved(1u8), resolved("two"), resolved(3.0f32)));
/// assert_eq!(joined.get().unwrap(), (1, "two", 3.0));
/// ```
pub fn tuple<P>(promises: P) -> Promise<P::Output>
where
    P: PromiseTuple,
{
    promises.join()
}

macro_rules! impl_promise_tuple {
    ($count:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name),+> PromiseTuple for ($(Promise<$name>,)+)
        where
            $($name: Clone + Send + 'static,)+
        {
            type Output = ($($name,)+);

            fn join(self) -> Promise<Self::Output> {
                let combined = Promise::new();
                let slots = Arc::new(Mutex::new(($(Option::<$name>::None,)+)));
                let remaining = Arc::new(AtomicUsize::new($count));

                let collect = |slots: &mut ($(Option<$name>,)+)| -> Option<Self::Output> {
                    Some(($(slots.$idx.take()?,)+))
                };

                $(
                    {
                        let on_value = combined.clone();
                        let on_error = combined.clone();
                        let slots = slots.clone();
                        let remaining = remaining.clone();

                        self.$idx.subscribe(
                            move |value| {
                                let mut guard =
                                    slots.lock().unwrap_or_else(PoisonError::into_inner);
                                guard.$idx = Some(value);

                                if remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
                                    return;
                                }

                                let values = collect(&mut *guard);
                                drop(guard);

                                if let Some(values) = values {
                                    on_value.resolve(values);
                                }
                            },
                            move |error| {
                                on_error.reject(error);
                            },
                        );
                    }
                )+

                combined
            }
        }
    };
}

impl_promise_tuple!(1; A: 0);
impl_promise_tuple!(2; A: 0, B: 1);
impl_promise_tuple!(3; A: 0, B: 1, C: 2);
impl_promise_tuple!(4; A: 0, B: 1, C: 2, D: 3);
impl_promise_tuple!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_promise_tuple!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_promise_tuple!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_promise_tuple!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
