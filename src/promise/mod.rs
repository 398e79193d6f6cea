//! Promise primitives.
//!
//! This module defines the shared, single-assignment result cell that every
//! executor hands back from `submit`, together with the operations built on
//! top of it:
//! - settlement and blocking waits ([`core`]),
//! - chained continuations ([`Promise::then`] and friends),
//! - the `all` / `any` / `tuple` combinators.
//!
//! Continuations run on whichever thread settles the source promise, or
//! immediately on the registering thread when the source is already
//! settled.

pub(crate) mod combinators;
pub(crate) mod continuation;
pub(crate) mod core;
pub(crate) mod state;

pub use combinators::{PromiseTuple, all, any, tuple};
pub use self::core::{Promise, rejected, resolved};
pub use state::{Status, WaitStatus};
