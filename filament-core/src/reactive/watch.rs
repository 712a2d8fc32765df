//! Watch: change notification over a derived snapshot.
//!
//! A watch evaluates `source` inside a runner, so it re-runs whenever any
//! cell `source` reads is written. Each re-run compares the new snapshot with
//! the previous one using [`DeepEq`]; only a structural difference reaches
//! the callback. This is what lets a watch sit on top of cells that hold
//! freshly built values, where the identity check on writes would fire on
//! every assignment.
//!
//! The first snapshot is taken by the runner's first (tracked) run. The
//! callback never fires during construction.

use std::cell::RefCell;

use super::cleanup::Cleanup;
use super::context::untracked;
use super::effect::{Effect, EffectOptions};
use crate::equality::DeepEq;

/// Call `on_change(&new, &old)` whenever `source()` stops being deeply equal
/// to its previous result.
///
/// ```rust
/// use filament_core::{state, watch};
///
/// let count = state(10);
/// let source = count.clone();
/// watch(move || source.get(), |new, old| println!("{old} -> {new}"));
///
/// count.set(10); // nothing
/// count.set(20); // prints "10 -> 20"
/// ```
pub fn watch<T, S, C>(source: S, on_change: C) -> Effect
where
    T: DeepEq + Clone + 'static,
    S: Fn() -> T + 'static,
    C: Fn(&T, &T) + 'static,
{
    watch_with(source, on_change, EffectOptions::default())
}

/// [`watch`] with options. With `skip` set, `source` is never evaluated.
pub fn watch_with<T, S, C>(source: S, on_change: C, options: EffectOptions) -> Effect
where
    T: DeepEq + Clone + 'static,
    S: Fn() -> T + 'static,
    C: Fn(&T, &T) + 'static,
{
    if options.skip {
        return Effect::skipped();
    }

    let snapshot: RefCell<Option<T>> = RefCell::new(None);

    Effect::spawn(move || {
        let next = source();

        let unchanged = snapshot.borrow().as_ref().map(|prev| prev.deep_eq(&next));
        match unchanged {
            None => *snapshot.borrow_mut() = Some(next),
            Some(true) => {}
            Some(false) => {
                // Store first: the callback may write cells that re-run this
                // watch, and that run must compare against `next`.
                let previous = snapshot.replace(Some(next.clone()));
                if let Some(previous) = previous {
                    untracked(|| on_change(&next, &previous));
                }
            }
        }

        Cleanup::none()
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
