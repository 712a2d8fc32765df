//! Equality Oracles
//!
//! Two notions of "did this value change?" are used by the engine:
//!
//! - [`SameValue`] is the cheap identity check a [`State`](crate::State)
//!   performs on every write. Plain data compares by value, shared pointers
//!   compare by address. It never walks into a structure.
//!
//! - [`DeepEq`] is structural equality, used by
//!   [`watch`](crate::watch) to decide whether a freshly computed snapshot
//!   differs from the previous one. Snapshots are frequently rebuilt from
//!   scratch on every run, so identity would almost never hold for them.
//!
//! Keeping writes on the identity check means a cell holding an `Rc<Vec<_>>`
//! notifies whenever a *new* vector is installed, even if its contents are
//! equal; a watch layered on top filters that out.

mod deep;
mod same;

pub use deep::{deep_equal, deep_equal_serialized, DeepEq, Json};
pub use same::{same_value, SameValue};
