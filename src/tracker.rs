//! LIFO disposal tracking: aggregate many releasable resources into one.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::action::ActionResource;
use crate::errors::{ReleaseError, ReleaseResult};
use crate::guard::OnceGuard;
use crate::weak::WeakResource;
use crate::{Releasable, SharedReleasable};

/// Tracks releasable resources and releases them in the reverse order they
/// were added.
///
/// Reverse registration order mirrors stack-unwind semantics: a resource
/// added after another may depend on it, so it is torn down first. The
/// tracker's own release is idempotent; concurrent callers all return
/// promptly while exactly one performs the teardown.
///
/// Strongly added resources are owned by the tracker until release. Weakly
/// added resources stay owned wherever they already live; the tracker only
/// holds a [`WeakResource`] observer that releases the target
/// opportunistically if it is still alive at teardown time.
///
/// Registration should complete before teardown begins. The entry stack is
/// lock-guarded, so a racing add stays memory-safe; an add that loses the
/// race against [`release`](DisposalTracker::release) has its resource
/// released immediately instead of being tracked, so nothing can slip past
/// teardown unreleased.
///
/// # Example
///
/// ```rust
/// use releasable::DisposalTracker;
///
/// let tracker = DisposalTracker::new();
/// tracker.add_fn(|| println!("connection closed"));
/// tracker.add_fn(|| println!("session over connection closed"));
/// tracker.release()?; // session first, connection second
/// # Ok::<(), releasable::ReleaseError>(())
/// ```
#[derive(Default)]
pub struct DisposalTracker {
    entries: Mutex<Vec<SharedReleasable>>,
    released: OnceGuard,
}

impl DisposalTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource with strong ownership and returns the handle
    /// unchanged, so call sites can add and keep a handle in one expression.
    pub fn add<R>(&self, resource: Arc<R>) -> Arc<R>
    where
        R: Releasable + Send + Sync + 'static,
    {
        // Bind before the call: the clone keeps its concrete type and
        // unsizes at the argument, instead of inference pinning the clone
        // to the trait object and rejecting `&resource`.
        let entry = Arc::clone(&resource);
        self.push(entry);
        resource
    }

    /// Wraps a callback in an [`ActionResource`], adds it strongly, and
    /// returns the wrapper.
    pub fn add_fn<F>(&self, action: F) -> Arc<ActionResource>
    where
        F: FnOnce() + Send + 'static,
    {
        self.add(Arc::new(ActionResource::new(action)))
    }

    /// Like [`add_fn`](DisposalTracker::add_fn) for a callback whose failure
    /// should surface from the tracker's release.
    pub fn add_fallible_fn<F>(&self, action: F) -> Arc<ActionResource>
    where
        F: FnOnce() -> ReleaseResult + Send + 'static,
    {
        self.add(Arc::new(ActionResource::fallible(action)))
    }

    /// Adds a resource weakly: the tracker stores (and returns) a
    /// [`WeakResource`] observer, never the target itself.
    ///
    /// The weak entry will not keep the target alive; callers must retain
    /// their own strong handle if the target should survive until teardown.
    pub fn add_weak<R>(&self, resource: &Arc<R>) -> Arc<WeakResource>
    where
        R: Releasable + Send + Sync + 'static,
    {
        self.add(Arc::new(WeakResource::new(resource)))
    }

    /// Dispatches to [`add`](DisposalTracker::add) or
    /// [`add_weak`](DisposalTracker::add_weak) based on `weak`.
    pub fn add_maybe_weak<R>(&self, resource: Arc<R>, weak: bool) -> SharedReleasable
    where
        R: Releasable + Send + Sync + 'static,
    {
        // Intermediate bindings keep each branch concretely typed; the tail
        // expressions unsize to the return type instead of the branches
        // unifying against each other.
        if weak {
            let wrapper = self.add_weak(&resource);
            wrapper
        } else {
            let handle = self.add(resource);
            handle
        }
    }

    /// Number of resources currently tracked.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns whether no resources are currently tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns whether the tracker has already been released.
    pub fn is_released(&self) -> bool {
        self.released.is_set()
    }

    /// Releases every tracked resource in reverse registration order, then
    /// clears the collection. Later calls are no-ops.
    ///
    /// A failing entry does not shield the remaining ones: every entry is
    /// released and failures are collected. A single failure surfaces
    /// unchanged; several become [`ReleaseError::Aggregate`].
    pub fn release(&self) -> ReleaseResult {
        if self.released.set() {
            return Ok(());
        }

        // Drain under the lock, release outside it: a release callback may
        // touch this tracker again without deadlocking.
        let entries = std::mem::take(&mut *self.entries.lock());
        debug!(count = entries.len(), "releasing tracked resources");

        let mut failures = Vec::new();
        for entry in entries.into_iter().rev() {
            if let Err(err) = entry.release() {
                failures.push(err);
            }
        }
        ReleaseError::collect(failures)
    }

    fn push(&self, resource: SharedReleasable) {
        let mut entries = self.entries.lock();
        // Checked under the lock: release() drains under the same lock after
        // setting the guard, so either this entry lands before the drain or
        // the set guard is visible here.
        if self.released.is_set() {
            drop(entries);
            warn!("resource added to an already released tracker; releasing it immediately");
            if let Err(err) = resource.release() {
                error!(%err, "immediate release of a late-added resource failed");
            }
            return;
        }
        entries.push(resource);
    }
}

// A tracker is itself releasable, so trackers can nest inside other
// trackers or scoped owners.
impl Releasable for DisposalTracker {
    fn release(&self) -> ReleaseResult {
        Self::release(self)
    }
}

impl Drop for DisposalTracker {
    fn drop(&mut self) {
        if self.released.is_set() || self.entries.get_mut().is_empty() {
            return;
        }
        warn!("disposal tracker dropped without an explicit release");
        if let Err(err) = self.release() {
            error!(%err, "fallback release during drop reported failures");
        }
    }
}

impl std::fmt::Debug for DisposalTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposalTracker")
            .field("tracked", &self.len())
            .field("released", &self.released.is_set())
            .finish()
    }
}
