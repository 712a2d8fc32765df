//! Error types for the reactive engine.
//!
//! Most operations in Filament cannot fail: reads, identity-compared writes
//! and effect handles never return errors. The variants here cover the two
//! places where something can actually go wrong: a runaway cascade of
//! re-entrant writes, and snapshotting a value through serde for deep
//! comparison.

use thiserror::Error;

/// Errors produced by the reactive engine.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// A write-triggers-write cascade nested deeper than the configured limit.
    ///
    /// This is raised as a panic payload message from inside a runner; it is
    /// fatal and never returned through a `Result`.
    #[error("reactive cascade nested {depth} runners deep (limit {limit}); a write cycle never converged")]
    CascadeOverflow {
        /// Nesting depth at which the cascade was stopped.
        depth: usize,
        /// The configured `max_depth`.
        limit: usize,
    },

    /// A value could not be converted into a JSON snapshot.
    #[error("failed to snapshot value for deep comparison: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReactiveError>;
