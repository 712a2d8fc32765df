//! Identities for the two sides of a dependency edge.
//!
//! A subscriber is any computation that depends on reactive values: effects,
//! the runner behind a computed cell, and the runner behind a watch. A source
//! is anything that can be read inside such a computation, which in practice
//! is a [`State`](super::State).

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscriber.
///
/// Each runner gets a unique ID when created. Cells store these IDs, never
/// the runners themselves, so a cell does not keep its dependents alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a reactive source (a cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Generate a new unique source ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a cell, as seen by the runners that read it.
///
/// Runners hold weak references to their sources so they can remove
/// themselves from cells they stopped reading.
pub(crate) trait Source {
    /// The cell's identity.
    fn source_id(&self) -> SourceId;

    /// Add `subscriber` to this cell's subscriber set. Idempotent.
    fn subscribe(&self, subscriber: SubscriberId);

    /// Remove `subscriber` from this cell's subscriber set.
    fn unsubscribe(&self, subscriber: SubscriberId);
}
