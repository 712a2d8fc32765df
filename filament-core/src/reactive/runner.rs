//! Runner: the re-executable unit behind every effect, computed cell and
//! watch.
//!
//! # Run protocol
//!
//! 1. Release the cleanup returned by the previous run.
//! 2. Refuse to nest deeper than the configured `max_depth`. Only runner
//!    frames count; untracked frames in between do not.
//! 3. Push a context frame and execute the callback. Every cell read on the
//!    way subscribes this runner.
//! 4. Pop the frame on every exit path.
//! 5. On success, unsubscribe from cells the previous run read but neither
//!    this run nor a re-entrant run of the same runner read, and keep the new
//!    cleanup.
//!
//! If the callback panics, the frame is still popped and the runner keeps
//! every subscription it had plus whatever it read before failing. The panic
//! then continues to the caller.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use super::cleanup::Cleanup;
use super::context::{Dependencies, ReactiveContext};
use super::runtime::Runtime;
use super::subscriber::SubscriberId;
use crate::error::ReactiveError;

type Callback = Rc<dyn Fn() -> Cleanup>;

/// A reactive callback plus its pending cleanup and current dependencies.
pub(crate) struct Runner {
    id: SubscriberId,
    /// Shared so a re-entrant run can call it while an outer run is active.
    callback: Callback,
    cleanup: RefCell<Cleanup>,
    /// Cells read during the most recent completed run.
    sources: RefCell<Dependencies>,
    runs: Cell<usize>,
    disposed: Cell<bool>,
}

impl Runner {
    /// Create a runner. It does not run until [`Runner::run`] is called.
    pub(crate) fn new<F>(callback: F) -> Rc<Self>
    where
        F: Fn() -> Cleanup + 'static,
    {
        Rc::new(Self {
            id: SubscriberId::new(),
            callback: Rc::new(callback),
            cleanup: RefCell::new(Cleanup::none()),
            sources: RefCell::new(Dependencies::new()),
            runs: Cell::new(0),
            disposed: Cell::new(false),
        })
    }

    pub(crate) fn id(&self) -> SubscriberId {
        self.id
    }

    /// Number of completed runs.
    pub(crate) fn run_count(&self) -> usize {
        self.runs.get()
    }

    /// Number of cells this runner is currently subscribed to.
    pub(crate) fn source_count(&self) -> usize {
        self.sources.borrow().len()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Execute the callback under this runner's tracking frame.
    pub(crate) fn run(&self) {
        if self.disposed.get() {
            return;
        }

        self.cleanup.take().release();

        let limit = Runtime::config().max_depth;
        let depth = ReactiveContext::tracked_depth() + 1;
        if depth > limit {
            panic!("{}", ReactiveError::CascadeOverflow { depth, limit });
        }

        trace!(subscriber = self.id.raw(), depth, "running");

        let callback = Rc::clone(&self.callback);
        let scope = RunScope::enter(self);
        let cleanup = callback();
        scope.complete();

        self.runs.set(self.runs.get() + 1);

        if self.disposed.get() {
            // Disposed from inside its own run; nothing will release this later.
            self.detach();
            cleanup.release();
        } else {
            // A nested re-run of this same runner may have stored a cleanup
            // while we were executing.
            self.cleanup.replace(cleanup).release();
        }
    }

    /// Stop the runner for good: unregister it, drop its subscriptions and
    /// release its pending cleanup. Idempotent.
    pub(crate) fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }

        Runtime::unregister(self.id);
        self.detach();
        self.cleanup.take().release();
        debug!(subscriber = self.id.raw(), "disposed");
    }

    /// Remove this runner from every cell it is subscribed to.
    fn detach(&self) {
        for (_, source) in self.sources.take() {
            if let Some(source) = source.upgrade() {
                source.unsubscribe(self.id);
            }
        }
    }

    /// Keep `current` as the dependency set and unsubscribe from everything
    /// in `previous` that this run did not read.
    ///
    /// A re-entrant run of this same runner that completed while this one was
    /// executing has stored its own set in `sources`. That set is at least as
    /// recent as ours, so it is kept alongside `current` and never pruned.
    fn reconcile(&self, previous: Dependencies, current: Dependencies) {
        let mut keep = current;
        let nested = self.sources.take();
        if !nested.is_empty() {
            trace!(
                subscriber = self.id.raw(),
                nested = nested.len(),
                "keeping dependencies of a re-entrant run"
            );
        }
        for (id, source) in nested {
            keep.entry(id).or_insert(source);
        }

        for (id, source) in previous {
            if keep.contains_key(&id) {
                continue;
            }
            if let Some(source) = source.upgrade() {
                source.unsubscribe(self.id);
                trace!(
                    subscriber = self.id.raw(),
                    source = source.source_id().raw(),
                    "pruned stale dependency"
                );
            }
        }

        self.adopt(keep);
    }

    /// Store `sources` as the dependency set, making sure every live cell in
    /// it still lists this runner. A re-entrant run may have pruned cells an
    /// outer run of the same runner read.
    fn adopt(&self, sources: Dependencies) {
        for source in sources.values() {
            if let Some(source) = source.upgrade() {
                source.subscribe(self.id);
            }
        }
        *self.sources.borrow_mut() = sources;
    }
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("id", &self.id)
            .field("runs", &self.runs.get())
            .field("sources", &self.source_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Scoped tracking for one run.
///
/// Holds the context frame and the previous run's dependencies. Completing
/// the scope reconciles subscriptions; dropping it without completing (a
/// panic in the callback) keeps the union of old and partial dependencies.
struct RunScope<'a> {
    runner: &'a Runner,
    previous: Dependencies,
    context: Option<ReactiveContext>,
}

impl<'a> RunScope<'a> {
    fn enter(runner: &'a Runner) -> Self {
        let previous = runner.sources.take();
        Self {
            runner,
            previous,
            context: Some(ReactiveContext::enter(runner.id)),
        }
    }

    fn complete(mut self) {
        if let Some(context) = self.context.take() {
            let current = context.exit();
            let previous = std::mem::take(&mut self.previous);
            self.runner.reconcile(previous, current);
        }
    }
}

impl Drop for RunScope<'_> {
    fn drop(&mut self) {
        let Some(context) = self.context.take() else {
            return;
        };

        let partial = context.exit();
        let mut merged = std::mem::take(&mut self.previous);
        merged.extend(self.runner.sources.take());
        merged.extend(partial);
        self.runner.adopt(merged);

        if self.runner.disposed.get() {
            self.runner.detach();
        }
    }
}
