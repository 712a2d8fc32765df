//! Filament Core
//!
//! This crate provides a small, synchronous, fine-grained reactive engine.
//! It implements:
//!
//! - Reactive cells with automatic dependency tracking
//! - Computed cells kept in sync with a derivation
//! - Effects with per-run cleanup, and watches with structural change
//!   detection
//! - Identity and deep equality oracles
//!
//! Rendering, event handling and templating are left to callers. The one
//! hook offered to them is [`Runtime::set_write_hook`], called after every
//! value-changing write.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: cells, runners, the context stack and the per-thread runtime
//! - `equality`: `SameValue` (used on writes) and `DeepEq` (used by watches)
//! - `config`: per-thread runtime tunables
//! - `error`: the crate's error type
//!
//! # Example
//!
//! ```rust
//! use filament_core::{computed, effect, state};
//!
//! // Create a cell
//! let count = state(0);
//!
//! // Create a derived value
//! let source = count.clone();
//! let doubled = computed(move || source.get() * 2);
//!
//! // Create an effect
//! let (count_r, doubled_r) = (count.clone(), doubled.clone());
//! effect(move || {
//!     println!("Count: {}, Doubled: {}", count_r.get(), doubled_r.get());
//! });
//!
//! // Update the cell
//! count.set(5);
//! // Effect runs synchronously inside `set`
//! assert_eq!(doubled.get(), 10);
//! ```

pub mod config;
pub mod equality;
pub mod error;
pub mod reactive;

pub use config::RuntimeConfig;
pub use equality::{deep_equal, DeepEq, Json, SameValue};
pub use error::{ReactiveError, Result};
pub use reactive::{
    computed, effect, effect_with, readonly, state, untracked, watch, watch_with, Cleanup, Effect,
    EffectOptions, IntoCleanup, Readonly, Runtime, State,
};
