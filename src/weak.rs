//! Weak-reference-aware resource adapter.

use std::sync::{Arc, Weak};

use crate::errors::ReleaseResult;
use crate::guard::OnceGuard;
use crate::Releasable;

/// A [`Releasable`] adapter that holds only a weak reference to its target.
///
/// Constructing a `WeakResource` never extends the target's lifetime: the
/// target stays owned wherever it already lives, and this adapter merely
/// observes it. On [`release`](Releasable::release) the weak reference is
/// upgraded; if the target has been reclaimed in the meantime the release
/// succeeds as a no-op. That is the one place in this crate where "the thing
/// I was supposed to clean up is already gone" is a defined success path
/// rather than a failure.
///
/// # Example
///
/// ```rust
/// use releasable::{ActionResource, WeakResource};
/// use std::sync::Arc;
///
/// let target = Arc::new(ActionResource::new(|| {}));
/// let weak = WeakResource::new(&target);
///
/// drop(target);
/// weak.release()?; // target already reclaimed: success, nothing invoked
/// # Ok::<(), releasable::ReleaseError>(())
/// ```
pub struct WeakResource {
    target: Weak<dyn Releasable + Send + Sync>,
    released: OnceGuard,
}

impl WeakResource {
    /// Creates an adapter observing `target` without owning it.
    pub fn new<R>(target: &Arc<R>) -> Self
    where
        R: Releasable + Send + Sync + 'static,
    {
        // Downgrade first, unsize second: annotating the downgrade itself
        // would pin its type parameter to the trait object and reject the
        // `&Arc<R>` argument.
        let target = Arc::downgrade(target);
        let target: Weak<dyn Releasable + Send + Sync> = target;
        Self {
            target,
            released: OnceGuard::new(),
        }
    }

    /// Returns whether the adapter itself has already been released.
    ///
    /// This reports the adapter's own state, not the target's: it stays
    /// `false` while the target is merely reclaimed.
    pub fn is_released(&self) -> bool {
        self.released.is_set()
    }

    /// Returns whether the observed target is still alive.
    pub fn target_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Releases the adapter, forwarding to the target if it still exists.
    pub fn release(&self) -> ReleaseResult {
        if self.released.set() {
            return Ok(());
        }
        self.target
            .upgrade()
            .map_or(Ok(()), |target| target.release())
    }
}

impl Releasable for WeakResource {
    fn release(&self) -> ReleaseResult {
        Self::release(self)
    }
}

impl std::fmt::Debug for WeakResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakResource")
            .field("released", &self.released.is_set())
            .field("target_alive", &self.target_alive())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::action::ActionResource;

    fn counting_target() -> (Arc<ActionResource>, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let target = Arc::new(ActionResource::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        (target, runs)
    }

    #[test]
    fn release_forwards_to_a_live_target_exactly_once() {
        let (target, runs) = counting_target();
        let weak = WeakResource::new(&target);
        assert!(weak.target_alive());

        weak.release().unwrap();
        weak.release().unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(weak.is_released());
    }

    #[test]
    fn holding_the_adapter_does_not_keep_the_target_alive() {
        let (target, runs) = counting_target();
        let weak = WeakResource::new(&target);

        drop(target);
        assert!(!weak.target_alive());

        weak.release().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 0, "nothing left to invoke");
        assert!(weak.is_released(), "the adapter itself is now spent");
    }

    #[test]
    fn target_released_elsewhere_then_reclaimed_is_a_quiet_success() {
        let (target, runs) = counting_target();
        let weak = WeakResource::new(&target);

        target.release().unwrap();
        drop(target);

        weak.release().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1, "only the direct release ran");
    }
}
