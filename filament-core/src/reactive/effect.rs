//! Effect Implementation
//!
//! An Effect is a side-effecting computation that runs whenever the cells it
//! read on its last run change.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately to establish
//!    initial dependencies.
//!
//! 2. When any dependency is written with a different value, the effect runs
//!    again, synchronously, inside that write.
//!
//! 3. Each run records a fresh dependency set; cells the new run did not read
//!    stop notifying the effect.
//!
//! # Cleanup
//!
//! The callback may return a [`Cleanup`]. It is released right before the
//! next run and when the effect is disposed. This is where timers, listeners
//! and other per-run resources are torn down.
//!
//! # Lifetime
//!
//! Effects are owned by the thread's runtime, not by the returned handle.
//! Dropping an [`Effect`] leaves it running; call [`Effect::dispose`] to stop
//! it.

use std::marker::PhantomData;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::cleanup::{Cleanup, IntoCleanup};
use super::runner::Runner;
use super::runtime::Runtime;
use super::subscriber::SubscriberId;

/// Options accepted by [`effect_with`] and
/// [`watch_with`](super::watch_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectOptions {
    /// Do not create the effect at all: no initial run, no tracking, no
    /// future reactivity.
    pub skip: bool,
}

impl EffectOptions {
    /// Options with `skip` set.
    pub fn skipped() -> Self {
        Self { skip: true }
    }

    /// Builder-style setter for `skip`.
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }
}

/// Handle to a running effect.
///
/// Handles are cheap to copy. They only refer to the effect by ID, so they
/// are inert on any thread other than the one that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Effect {
    id: Option<SubscriberId>,
    _local: PhantomData<Rc<()>>,
}

/// Run `f` now and again whenever a cell it read changes.
///
/// ```rust
/// use filament_core::{effect, state, Cleanup};
///
/// let ticks = state(0);
/// let reader = ticks.clone();
/// effect(move || {
///     let n = reader.get();
///     Cleanup::new(move || println!("leaving tick {n}"))
/// });
///
/// ticks.set(1); // prints "leaving tick 0"
/// ```
pub fn effect<F, C>(f: F) -> Effect
where
    F: Fn() -> C + 'static,
    C: IntoCleanup,
{
    effect_with(f, EffectOptions::default())
}

/// [`effect`] with options. With `skip` set, `f` never runs.
pub fn effect_with<F, C>(f: F, options: EffectOptions) -> Effect
where
    F: Fn() -> C + 'static,
    C: IntoCleanup,
{
    if options.skip {
        return Effect::skipped();
    }
    Effect::spawn(move || f().into_cleanup())
}

impl Effect {
    /// Register a runner and run it once.
    pub(crate) fn spawn<F>(callback: F) -> Self
    where
        F: Fn() -> Cleanup + 'static,
    {
        let runner = Runner::new(callback);
        let id = runner.id();
        Runtime::register(Rc::clone(&runner));
        runner.run();

        Self {
            id: Some(id),
            _local: PhantomData,
        }
    }

    /// A handle for an effect that was never created.
    pub(crate) fn skipped() -> Self {
        Self {
            id: None,
            _local: PhantomData,
        }
    }

    /// The runner's subscriber ID, or `None` if the effect was skipped.
    pub fn id(&self) -> Option<SubscriberId> {
        self.id
    }

    /// Whether the effect was skipped at creation.
    pub fn is_skipped(&self) -> bool {
        self.id.is_none()
    }

    /// Whether the effect is still registered and will react to changes.
    pub fn is_active(&self) -> bool {
        self.id.is_some_and(Runtime::is_registered)
    }

    /// Number of times the effect has run. Zero once disposed.
    pub fn run_count(&self) -> usize {
        self.runner().map_or(0, |runner| runner.run_count())
    }

    /// Number of cells the effect currently depends on.
    pub fn dependency_count(&self) -> usize {
        self.runner().map_or(0, |runner| runner.source_count())
    }

    /// Run the effect now, as if a dependency had changed.
    pub fn run(&self) {
        if let Some(runner) = self.runner() {
            runner.run();
        }
    }

    /// Stop the effect and release its pending cleanup. Idempotent.
    pub fn dispose(&self) {
        if let Some(runner) = self.runner() {
            runner.dispose();
        }
    }

    fn runner(&self) -> Option<Rc<Runner>> {
        self.id.and_then(Runtime::runner)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
