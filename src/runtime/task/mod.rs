//! Task primitives.
//!
//! This module defines how submitted work is represented inside an
//! executor:
//! - [`Runnable`]: the type-erased `run` / `cancel` interface queued by
//!   executors,
//! - `Task`: a callable bound to its output promise,
//! - [`Priority`]: the ordering key of the executor queue.

pub(crate) mod core;
pub(crate) mod priority;

pub(crate) use self::core::Task;

pub use self::core::Runnable;
pub use priority::Priority;
