//! Reactive Context
//!
//! The reactive context tracks which computation is currently running.
//! This enables automatic dependency tracking: when a cell is read,
//! the current computation is registered as a dependent.
//!
//! # Implementation
//!
//! We use a thread-local stack of frames. Running a runner pushes a frame
//! for it; reads attribute to the top frame only. When the computation
//! completes (or panics) the frame is popped by the guard's `Drop`.
//!
//! A frame may also be *untracked*: reads made under it attribute to nobody,
//! even if a runner frame sits further down the stack.
//!
//! Each frame collects the cells read while it was on top, so the runner can
//! compare them with the previous run and drop stale subscriptions.

use std::cell::RefCell;
use std::rc::Weak;

use indexmap::IndexMap;

use super::subscriber::{Source, SourceId, SubscriberId};

/// Cells read during one frame, in first-read order.
pub(crate) type Dependencies = IndexMap<SourceId, Weak<dyn Source>>;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

/// An entry in the reactive context stack.
struct ContextEntry {
    /// The runner this frame attributes reads to. `None` for untracked frames.
    subscriber: Option<SubscriberId>,
    /// Cells read while this frame was on top.
    dependencies: Dependencies,
}

/// Guard that pops its frame when dropped.
///
/// Frames are popped even if the computation panics, so a failing runner
/// never leaves stale attribution behind.
pub struct ReactiveContext {
    subscriber: Option<SubscriberId>,
    exited: bool,
}

impl ReactiveContext {
    /// Enter a tracking frame for the given subscriber.
    pub fn enter(subscriber_id: SubscriberId) -> Self {
        Self::push(Some(subscriber_id))
    }

    /// Enter an untracked frame. Reads under it register no dependency.
    pub fn untracked() -> Self {
        Self::push(None)
    }

    fn push(subscriber: Option<SubscriberId>) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(ContextEntry {
                subscriber,
                dependencies: Dependencies::new(),
            });
        });

        Self {
            subscriber,
            exited: false,
        }
    }

    /// Check if reads are currently being attributed to a subscriber.
    pub fn is_active() -> bool {
        Self::current_subscriber().is_some()
    }

    /// Get the subscriber reads are attributed to, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().and_then(|entry| entry.subscriber))
    }

    /// Number of frames on the stack, tracked or not.
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }

    /// Number of frames that attribute reads to a runner.
    pub fn tracked_depth() -> usize {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .iter()
                .filter(|entry| entry.subscriber.is_some())
                .count()
        })
    }

    /// Source IDs recorded in the current frame.
    pub fn dependencies() -> Vec<SourceId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|entry| entry.dependencies.keys().copied().collect())
                .unwrap_or_default()
        })
    }

    /// Record a read of `source` in the top frame.
    ///
    /// Returns the subscriber the read is attributed to, or `None` if the top
    /// frame is untracked or the stack is empty.
    pub(crate) fn track<F>(source: SourceId, downgrade: F) -> Option<SubscriberId>
    where
        F: FnOnce() -> Weak<dyn Source>,
    {
        CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let entry = stack.last_mut()?;
            let subscriber = entry.subscriber?;
            entry.dependencies.entry(source).or_insert_with(downgrade);
            Some(subscriber)
        })
    }

    /// Pop this frame and hand back the dependencies it collected.
    pub(crate) fn exit(mut self) -> Dependencies {
        self.exited = true;
        self.pop().map(|entry| entry.dependencies).unwrap_or_default()
    }

    fn pop(&self) -> Option<ContextEntry> {
        // `try_with` because guards can outlive the thread-local during
        // thread teardown.
        let popped = CONTEXT_STACK
            .try_with(|stack| stack.borrow_mut().pop())
            .ok()
            .flatten();

        if let Some(entry) = &popped {
            debug_assert_eq!(
                entry.subscriber, self.subscriber,
                "ReactiveContext mismatch: expected {:?}, got {:?}",
                self.subscriber, entry.subscriber
            );
        }
        popped
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        if !self.exited {
            self.pop();
        }
    }
}

/// Run `f` without attributing any of its reads to the current computation.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let _ctx = ReactiveContext::untracked();
    f()
}
