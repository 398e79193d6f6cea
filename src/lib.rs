//! # Deferrer
//!
//! **Deferrer** is a small task runtime built around thread-safe promises.
//! It is the layer an engine-style application uses to push work onto
//! background threads and bring the results back onto the one thread that
//! owns the main loop.
//!
//! It provides:
//!
//! - A **promise** type: a shared, single-assignment result cell with
//!   blocking waits and chained continuations (`then`, `except`, `and_then`)
//! - **Combinators** joining several promises: `all`, `any` and `tuple`
//! - A **worker pool** draining a priority queue on background threads, with
//!   passive and participating waits
//! - A **scheduler** with the same queue but no thread of its own, drained
//!   only when the owner thread pumps it
//! - A **deferrer** facade tying the two together
//!
//! ## Quick Start
//!
//! ```rust
//! use deferrer::{Executor, Priority, WorkerPool};
//!
//! let pool = WorkerPool::new(2).unwrap();
//!
//! let sum = pool
//!     .submit_with_priority(Priority::High, || (1..=10).sum::<u32>())
//!     .then(|total| total * 2);
//!
//! assert_eq!(sum.get().unwrap(), 110);
//! ```
//!
//! ## Modules
//!
//! - [`promise`] — The promise cell, continuations and combinators
//!
//! ## Errors
//!
//! Failures never escape an executor: a panicking or failing task rejects
//! its promise, and a task dropped unrun at shutdown is rejected with
//! [`Error::Cancelled`].

mod deferrer;
mod error;
mod runtime;

pub mod promise;

pub use deferrer::Deferrer;
pub use error::Error;
pub use promise::{Promise, PromiseTuple, Status, WaitStatus, all, any, rejected, resolved, tuple};
pub use runtime::builder::WorkerPoolBuilder;
pub use runtime::executor::pool::WorkerPool;
pub use runtime::executor::scheduler::Scheduler;
pub use runtime::executor::{ExecStatus, Executor};
pub use runtime::task::{Priority, Runnable};
