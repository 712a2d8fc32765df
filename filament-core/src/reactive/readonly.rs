//! Read-only projection of a cell.

use std::fmt::{self, Debug};

use super::state::State;
use super::subscriber::SourceId;

/// A view of a [`State`] that can be read but not written.
///
/// Reads forward to the underlying cell, including dependency tracking. The
/// view keeps no subscriber state of its own.
pub struct Readonly<T> {
    state: State<T>,
}

/// Create a read-only view of `state`.
pub fn readonly<T: 'static>(state: &State<T>) -> Readonly<T> {
    state.readonly()
}

impl<T: 'static> Readonly<T> {
    pub(crate) fn new(state: State<T>) -> Self {
        Self { state }
    }

    /// The underlying cell's ID.
    pub fn id(&self) -> SourceId {
        self.state.id()
    }

    /// Get the current value, subscribing the running computation.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.state.get()
    }

    /// Borrow the current value, subscribing the running computation.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.state.with(f)
    }

    /// Get the current value without tracking.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.state.get_untracked()
    }
}

impl<T: 'static> From<State<T>> for Readonly<T> {
    fn from(state: State<T>) -> Self {
        Self::new(state)
    }
}

impl<T> Clone for Readonly<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Debug> Debug for Readonly<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Readonly").field(&self.state).finish()
    }
}
