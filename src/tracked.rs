//! RAII wrapper running the discard safety net at scope exit.
//!
//! Discard detection is deterministic here: instead of relying on
//! unpredictable reclamation timing, [`Tracked`] invokes
//! [`LifecycleGuard::warn_if_discarded_unclosed`] when it goes out of
//! scope. A resource closed explicitly beforehand makes the drop silent;
//! `into_inner` opts out of tracking entirely.

use std::sync::Arc;

use crate::error::Result;
use crate::guard::LifecycleGuard;
use crate::resource::Managed;

/// Scope-bound handle to a managed resource.
///
/// Dropping a `Tracked` whose resource was never closed triggers the
/// discard warning and a last-chance close (subject to the guard's
/// configuration).
pub struct Tracked<T: Managed> {
    resource: Option<Arc<T>>,
    guard: Arc<LifecycleGuard>,
}

impl<T: Managed> Tracked<T> {
    /// Track `resource` against the process-wide default guard.
    #[must_use]
    pub fn new(resource: Arc<T>) -> Self {
        Self::with_guard(resource, LifecycleGuard::global())
    }

    /// Track `resource` against a specific guard.
    #[must_use]
    pub fn with_guard(resource: Arc<T>, guard: Arc<LifecycleGuard>) -> Self {
        Self {
            resource: Some(resource),
            guard,
        }
    }

    /// Explicitly close the resource, at most once.
    ///
    /// # Errors
    ///
    /// Propagates the resource's own close failure, exactly like
    /// [`LifecycleGuard::request_close`].
    pub fn close(&self) -> Result<()> {
        self.guard.request_close(self.inner().as_ref())
    }

    /// Shared handle to the underlying resource.
    #[must_use]
    pub fn resource(&self) -> Arc<T> {
        Arc::clone(self.inner())
    }

    /// Take the resource out, opting out of discard tracking.
    #[must_use]
    pub fn into_inner(mut self) -> Arc<T> {
        self.resource.take().expect("tracked used after into_inner")
    }

    fn inner(&self) -> &Arc<T> {
        self.resource.as_ref().expect("tracked used after into_inner")
    }
}

impl<T: Managed> std::ops::Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.inner()
    }
}

impl<T: Managed> Drop for Tracked<T> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.guard.warn_if_discarded_unclosed(resource.as_ref());
        }
    }
}

impl<T: Managed> std::fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracked")
            .field("resource", &self.resource)
            .finish()
    }
}
