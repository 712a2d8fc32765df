//! Reactive Runtime
//!
//! The runtime is the per-thread home of everything that is not owned by a
//! single cell:
//!
//! 1. The runner registry. Cells only store [`SubscriberId`]s; the registry
//!    maps those IDs to live runners. Runners stay registered until their
//!    [`Effect`](super::Effect) handle disposes them.
//!
//! 2. The [`RuntimeConfig`] for this thread.
//!
//! 3. The optional write hook, invoked after every value-changing write so a
//!    rendering layer can refresh.
//!
//! # Thread Safety
//!
//! None of this is shared between threads. Each thread owns an independent
//! reactive graph; handles created on one thread are inert on another.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::context::ReactiveContext;
use super::runner::Runner;
use super::subscriber::SubscriberId;
use crate::config::RuntimeConfig;

type WriteHook = Rc<dyn Fn()>;

thread_local! {
    static RUNNERS: RefCell<HashMap<SubscriberId, Rc<Runner>>> = RefCell::new(HashMap::new());
    static CONFIG: Cell<RuntimeConfig> = Cell::new(RuntimeConfig::default());
    static WRITE_HOOK: RefCell<Option<WriteHook>> = const { RefCell::new(None) };
}

/// The per-thread reactive runtime.
pub struct Runtime;

impl Runtime {
    /// Register a runner so cells can reach it by ID.
    pub(crate) fn register(runner: Rc<Runner>) {
        let id = runner.id();
        RUNNERS.with(|runners| runners.borrow_mut().insert(id, runner));
        debug!(subscriber = id.raw(), "runner registered");
    }

    /// Remove a runner from the registry.
    pub(crate) fn unregister(id: SubscriberId) -> Option<Rc<Runner>> {
        RUNNERS
            .try_with(|runners| runners.borrow_mut().remove(&id))
            .ok()
            .flatten()
    }

    /// Look up a live runner.
    pub(crate) fn runner(id: SubscriberId) -> Option<Rc<Runner>> {
        RUNNERS.with(|runners| runners.borrow().get(&id).cloned())
    }

    /// Dispose a runner by ID if it is still registered.
    ///
    /// Safe to call while the thread is shutting down; the registry may
    /// already be gone by then.
    pub(crate) fn dispose_runner(id: SubscriberId) {
        let runner = RUNNERS
            .try_with(|runners| {
                runners
                    .try_borrow()
                    .ok()
                    .and_then(|runners| runners.get(&id).cloned())
            })
            .ok()
            .flatten();

        if let Some(runner) = runner {
            runner.dispose();
        }
    }

    /// Whether a runner with this ID is still registered.
    pub fn is_registered(id: SubscriberId) -> bool {
        RUNNERS.with(|runners| runners.borrow().contains_key(&id))
    }

    /// Number of live runners on this thread.
    pub fn runner_count() -> usize {
        RUNNERS.with(|runners| runners.borrow().len())
    }

    /// Install a configuration for this thread.
    pub fn configure(config: RuntimeConfig) {
        debug!(?config, "runtime configured");
        CONFIG.with(|cell| cell.set(config));
    }

    /// The configuration in effect on this thread.
    pub fn config() -> RuntimeConfig {
        CONFIG.with(Cell::get)
    }

    /// Install a hook called synchronously after every value-changing write.
    ///
    /// The hook runs after the written cell's subscribers. It must not write
    /// to the cell that triggered it.
    pub fn set_write_hook<F>(hook: F)
    where
        F: Fn() + 'static,
    {
        WRITE_HOOK.with(|slot| *slot.borrow_mut() = Some(Rc::new(hook)));
    }

    /// Remove the write hook, if any.
    pub fn clear_write_hook() {
        WRITE_HOOK.with(|slot| slot.borrow_mut().take());
    }

    /// Invoke the write hook. Called by cells after notifying subscribers.
    pub(crate) fn notify_write() {
        // Clone out of the slot so the hook may replace itself.
        let hook = WRITE_HOOK.with(|slot| slot.borrow().clone());
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Get the current subscriber being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        ReactiveContext::current_subscriber()
    }

    /// Check if we're inside a tracking context.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }

    /// Current nesting depth of reactive frames.
    pub fn depth() -> usize {
        ReactiveContext::depth()
    }
}
