//! Construction and dispatch over a frozen declaration table.
//!
//! [`Runtime`] is the entry point: it selects constructors, follows
//! `this(...)`/`super(...)` delegation, runs init units in declaration order
//! across the inheritance chain and dispatches member calls.

pub mod binder;
pub mod config;
mod construct;
mod context;
pub mod heap;
mod init;
pub mod instance;
pub mod journal;
pub mod overload;
mod runtime;

pub use binder::{BoundArgs, Rank, TypeCheck, bind};
pub use config::{DEFAULT_MAX_DEPTH, RuntimeConfig};
pub use heap::ObjectHeap;
pub use instance::Instance;
pub use journal::Journal;
pub use overload::{NoMatch, OverloadMatch, find_best_match};
pub use runtime::Runtime;

#[cfg(test)]
mod tests;
