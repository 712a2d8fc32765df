//! State Implementation
//!
//! A `State` is the fundamental reactive primitive. It holds a value and
//! tracks which runners depend on it.
//!
//! # How State Works
//!
//! 1. When a state is read while a runner is executing, the state adds that
//!    runner's ID to its subscriber set.
//!
//! 2. When a write installs a value that is not the
//!    [same value](crate::equality::SameValue) as the current one, every
//!    subscriber re-runs synchronously, in the order it first subscribed,
//!    before `set` returns.
//!
//! 3. Re-runs may write to other cells (or this one). Those writes cascade
//!    immediately; there is no queue.
//!
//! # Memory Layout
//!
//! Each state consists of:
//! - A unique ID (8 bytes)
//! - The value, behind a `RefCell`
//! - An insertion-ordered set of subscriber IDs
//!
//! All of it lives behind one `Rc`, so clones are cheap handles to the same
//! cell.

use std::cell::{Cell, RefCell};
use std::fmt::{self, Debug};
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use smallvec::SmallVec;
use tracing::trace;

use super::context::ReactiveContext;
use super::readonly::Readonly;
use super::runtime::Runtime;
use super::subscriber::{Source, SourceId, SubscriberId};
use crate::equality::SameValue;

struct StateInner<T> {
    id: SourceId,
    value: RefCell<T>,
    subscribers: RefCell<IndexSet<SubscriberId>>,
    /// Runner that exists only to keep this cell up to date (a computed
    /// cell's derivation). Disposed when the cell is freed.
    owner: Cell<Option<SubscriberId>>,
}

impl<T> Source for StateInner<T> {
    fn source_id(&self) -> SourceId {
        self.id
    }

    fn subscribe(&self, subscriber: SubscriberId) {
        self.subscribers.borrow_mut().insert(subscriber);
    }

    fn unsubscribe(&self, subscriber: SubscriberId) {
        self.subscribers.borrow_mut().shift_remove(&subscriber);
    }
}

impl<T> Drop for StateInner<T> {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.take() {
            Runtime::dispose_runner(owner);
        }
    }
}

/// A reactive cell holding a value of type `T`.
///
/// # Example
///
/// ```rust
/// use filament_core::{effect, state};
///
/// let count = state(0);
///
/// let observed = count.clone();
/// effect(move || println!("count is {}", observed.get()));
///
/// count.set(5); // prints "count is 5"
/// ```
pub struct State<T> {
    inner: Rc<StateInner<T>>,
}

/// Create a reactive cell.
pub fn state<T: 'static>(value: T) -> State<T> {
    State::new(value)
}

impl<T: 'static> State<T> {
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StateInner {
                id: SourceId::new(),
                value: RefCell::new(value),
                subscribers: RefCell::new(IndexSet::new()),
                owner: Cell::new(None),
            }),
        }
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> SourceId {
        self.inner.id
    }

    /// Register the current runner, if any, as a subscriber.
    fn track(&self) {
        let inner = &self.inner;
        let subscriber = ReactiveContext::track(inner.id, || {
            Rc::downgrade(inner) as Weak<dyn Source>
        });

        if let Some(subscriber) = subscriber {
            inner.subscribers.borrow_mut().insert(subscriber);
        }
    }

    /// Get the current value.
    ///
    /// If called while a runner is executing, this also subscribes that
    /// runner to the cell.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Borrow the current value, with tracking.
    ///
    /// The value stays borrowed while `f` runs, so `f` must not write to
    /// this same cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.inner.value.borrow())
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.with_untracked(T::clone)
    }

    /// Borrow the current value without tracking dependencies.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Set a new value and notify subscribers.
    ///
    /// Writing the same value is a no-op. Otherwise every subscriber re-runs
    /// before this returns, followed by the runtime's write hook.
    ///
    /// The subscribers notified are the ones present when the write starts.
    /// A runner that first subscribes while this write is notifying (for
    /// example an effect created by an earlier subscriber) is not run again
    /// by this write; it already ran once when it was created.
    pub fn set(&self, value: T)
    where
        T: SameValue,
    {
        let previous = {
            let mut current = self.inner.value.borrow_mut();
            if current.same_value(&value) {
                return;
            }
            std::mem::replace(&mut *current, value)
        };
        drop(previous);

        self.notify_subscribers();
        Runtime::notify_write();
    }

    /// Update the value using a function of the current one.
    ///
    /// The read of the current value is not tracked.
    pub fn update<F>(&self, f: F)
    where
        T: SameValue,
        F: FnOnce(&T) -> T,
    {
        let next = self.with_untracked(f);
        self.set(next);
    }

    /// Re-run every subscriber, in subscription order.
    fn notify_subscribers(&self) {
        let snapshot: SmallVec<[SubscriberId; 4]> =
            self.inner.subscribers.borrow().iter().copied().collect();

        trace!(source = self.inner.id.raw(), subscribers = snapshot.len(), "notifying");

        for id in snapshot {
            // An earlier re-run in this cascade may have dropped the
            // subscription.
            if !self.inner.subscribers.borrow().contains(&id) {
                continue;
            }

            match Runtime::runner(id) {
                Some(runner) => runner.run(),
                None => self.inner.unsubscribe(id),
            }
        }
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Whether `subscriber` is currently subscribed to this cell.
    pub fn has_subscriber(&self, subscriber: SubscriberId) -> bool {
        self.inner.subscribers.borrow().contains(&subscriber)
    }

    /// Tie `runner` to this cell: it is disposed when the last handle to the
    /// cell is dropped.
    pub(crate) fn set_owner(&self, runner: SubscriberId) {
        self.inner.owner.set(Some(runner));
    }

    /// A handle that does not keep the cell alive.
    pub(crate) fn downgrade(&self) -> WeakState<T> {
        WeakState {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// A read-only view of this cell.
    pub fn readonly(&self) -> Readonly<T> {
        Readonly::new(self.clone())
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Non-owning counterpart of [`State`].
pub(crate) struct WeakState<T> {
    inner: Weak<StateInner<T>>,
}

impl<T> WeakState<T> {
    pub(crate) fn upgrade(&self) -> Option<State<T>> {
        self.inner.upgrade().map(|inner| State { inner })
    }
}

impl<T: Debug> Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("State");
        debug.field("id", &self.inner.id);
        match self.inner.value.try_borrow() {
            Ok(value) => debug.field("value", &*value),
            Err(_) => debug.field("value", &"<borrowed>"),
        };
        debug
            .field("subscriber_count", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Default + 'static> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
