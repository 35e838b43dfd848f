//! Callback-to-resource adapter.

use parking_lot::Mutex;

use crate::errors::ReleaseResult;
use crate::guard::OnceGuard;
use crate::Releasable;

type StoredAction = Box<dyn FnOnce() -> ReleaseResult + Send>;

/// Adapts a zero-argument callback into a [`Releasable`] resource.
///
/// The callback runs at most once, on the first call to
/// [`release`](Releasable::release); every later call returns immediately.
/// Errors from a fallible callback propagate to the caller of `release`
/// unmodified; this adapter never catches or suppresses them.
///
/// # Example
///
/// ```rust
/// use releasable::ActionResource;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let runs = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&runs);
/// let resource = ActionResource::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// resource.release()?;
/// resource.release()?;
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
/// # Ok::<(), releasable::ReleaseError>(())
/// ```
pub struct ActionResource {
    action: Mutex<Option<StoredAction>>,
    released: OnceGuard,
}

impl ActionResource {
    /// Wraps an infallible callback.
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::fallible(move || {
            action();
            Ok(())
        })
    }

    /// Wraps a callback whose failure propagates from `release`.
    pub fn fallible<F>(action: F) -> Self
    where
        F: FnOnce() -> ReleaseResult + Send + 'static,
    {
        Self {
            action: Mutex::new(Some(Box::new(action))),
            released: OnceGuard::new(),
        }
    }

    /// Returns whether the resource has already been released.
    pub fn is_released(&self) -> bool {
        self.released.is_set()
    }

    /// Releases the resource, invoking the callback if this is the first
    /// call.
    pub fn release(&self) -> ReleaseResult {
        if self.released.set() {
            return Ok(());
        }

        // The guard admits exactly one caller, so the take cannot race
        // another invocation; the lock satisfies &self access to the slot.
        let action = self.action.lock().take();
        action.map_or(Ok(()), |action| action())
    }
}

impl Releasable for ActionResource {
    fn release(&self) -> ReleaseResult {
        Self::release(self)
    }
}

impl std::fmt::Debug for ActionResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionResource")
            .field("released", &self.released.is_set())
            .finish_non_exhaustive()
    }
}
