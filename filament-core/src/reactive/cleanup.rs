//! Cleanup handles returned by effect callbacks.

use std::fmt;

/// An optional, single-use release action.
///
/// Effects return one of these from each run. The runner holds on to it and
/// releases it immediately before the next run, or when the effect is
/// disposed. Dropping an unreleased handle does *not* run it.
#[derive(Default)]
#[must_use = "a cleanup does nothing unless released"]
pub struct Cleanup(Option<Box<dyn FnOnce()>>);

impl Cleanup {
    /// Wrap a release action.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self(Some(Box::new(release)))
    }

    /// A cleanup that does nothing.
    pub fn none() -> Self {
        Self(None)
    }

    /// Whether there is an action waiting to be released.
    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }

    /// Run the release action, if any.
    pub fn release(self) {
        if let Some(release) = self.0 {
            release();
        }
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cleanup").field(&self.is_pending()).finish()
    }
}

/// Values an effect callback may return.
pub trait IntoCleanup {
    /// Convert into a [`Cleanup`].
    fn into_cleanup(self) -> Cleanup;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Cleanup {
        Cleanup::none()
    }
}

impl IntoCleanup for Cleanup {
    fn into_cleanup(self) -> Cleanup {
        self
    }
}

impl IntoCleanup for Option<Cleanup> {
    fn into_cleanup(self) -> Cleanup {
        self.unwrap_or_default()
    }
}
