//! Computed Implementation
//!
//! A computed cell is an ordinary [`State`] kept in sync with a derivation by
//! an internal runner. There is no separate node type: the runner reads
//! whatever the derivation reads, and writes the result into the cell with
//! [`State::set`]. Downstream readers subscribe to that cell like any other.
//!
//! # Propagation
//!
//! Changes flow eagerly. An upstream write re-runs the derivation inside the
//! write; if the derived value is not the same value as before, the computed
//! cell's own subscribers re-run too. Chains of any depth work this way.
//!
//! In a diamond (two computed cells over one source, both read by a third
//! computation) the third computation may observe one side updated before
//! the other, and runs once per intermediate change. Notification is never
//! batched, so this transient state is expected.
//!
//! # Seeding
//!
//! The derivation runs exactly once at construction, inside the runner, so
//! that first evaluation is tracked. Its result seeds the cell.
//!
//! # Lifetime
//!
//! The runner only holds a weak handle to its cell, and the cell owns the
//! runner: dropping the last handle to a computed cell disposes its runner,
//! which in turn drops everything the derivation captured.

use std::cell::RefCell;
use std::rc::Rc;

use super::cleanup::Cleanup;
use super::effect::Effect;
use super::state::{State, WeakState};
use crate::equality::SameValue;

/// Create a cell whose value is kept equal to `derive()`.
///
/// ```rust
/// use filament_core::{computed, state};
///
/// let count = state(2);
/// let source = count.clone();
/// let double = computed(move || source.get() * 2);
///
/// assert_eq!(double.get(), 4);
/// count.set(3);
/// assert_eq!(double.get(), 6);
/// ```
///
/// The returned cell can technically be written, but the next upstream
/// change will overwrite whatever was set.
pub fn computed<T, F>(derive: F) -> State<T>
where
    T: SameValue + 'static,
    F: Fn() -> T + 'static,
{
    // Hands the first value's cell out of the runner without the runner
    // keeping it alive.
    let seed: Rc<RefCell<Option<State<T>>>> = Rc::new(RefCell::new(None));
    let target: RefCell<Option<WeakState<T>>> = RefCell::new(None);

    let seed_slot = Rc::clone(&seed);
    let handle = Effect::spawn(move || {
        // Upgrade into a local so the slot is not borrowed during `set`.
        let cell = target.borrow().as_ref().map(WeakState::upgrade);
        match cell {
            Some(Some(state)) => state.set(derive()),
            // The cell is gone and its drop is disposing this runner.
            Some(None) => {}
            None => {
                let state = State::new(derive());
                *target.borrow_mut() = Some(state.downgrade());
                *seed_slot.borrow_mut() = Some(state);
            }
        }
        Cleanup::none()
    });

    let state = seed.borrow_mut().take();
    let state = state.expect("computed runner seeds its cell on the first run");
    if let Some(runner) = handle.id() {
        state.set_owner(runner);
    }
    state
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
