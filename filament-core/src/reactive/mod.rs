//! Reactive Primitives
//!
//! This module implements the reactive system: cells, computed cells,
//! effects and watches. These primitives form the foundation of Filament's
//! fine-grained reactivity.
//!
//! # Concepts
//!
//! ## State
//!
//! A [`State`] is a container for mutable data. When it is read while a
//! runner executes, the state registers that runner as a dependent. When a
//! write changes the value, all dependents re-run immediately.
//!
//! ## Computed
//!
//! A [`computed`] cell is a `State` kept equal to a derivation. It is
//! updated eagerly, inside the write that invalidated it.
//!
//! ## Effects and Watches
//!
//! An [`Effect`] is a side-effecting computation that re-runs whenever its
//! dependencies change. A [`watch`] is an effect that only calls back when a
//! derived snapshot is structurally different from the previous one.
//!
//! # Implementation Notes
//!
//! The reactive system uses a thread-local context stack to detect
//! dependencies automatically. Every computation runs inside a runner that
//! pushes a frame; reads register against the top frame. Runners live
//! in the thread's [`Runtime`] and are referenced from cells by
//! [`SubscriberId`] only.

mod cleanup;
mod computed;
mod context;
mod effect;
mod readonly;
mod runner;
mod runtime;
mod state;
mod subscriber;
mod watch;

pub use cleanup::{Cleanup, IntoCleanup};
pub use computed::computed;
pub use context::{untracked, ReactiveContext};
pub use effect::{effect, effect_with, Effect, EffectOptions};
pub use readonly::{readonly, Readonly};
pub use runtime::Runtime;
pub use state::{state, State};
pub use subscriber::{SourceId, SubscriberId};
pub use watch::{watch, watch_with};
