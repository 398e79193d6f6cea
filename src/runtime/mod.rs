//! Task execution runtime.
//!
//! This module contains the building blocks that turn submitted closures
//! into settled promises.
//!
//! It is responsible for:
//! - representing submitted work as type-erased tasks,
//! - ordering pending tasks by priority,
//! - running them on background worker threads or on a pumping thread,
//! - cancelling unstarted work at shutdown.

mod context;
mod queue;

pub(crate) mod builder;
pub(crate) mod executor;
pub(crate) mod task;
