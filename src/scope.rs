//! Scoped ownership of a disposal tracker with a drop-based fallback.

use std::sync::Arc;

use tracing::{error, warn};

use crate::action::ActionResource;
use crate::errors::ReleaseResult;
use crate::guard::OnceGuard;
use crate::tracker::DisposalTracker;
use crate::Releasable;

/// Owns a [`DisposalTracker`] and guarantees its teardown when the owner's
/// own lifetime ends.
///
/// Intended for embedding: a type that aggregates child resources holds a
/// `ScopedOwner`, registers children through [`track`](ScopedOwner::track),
/// and calls [`close`](ScopedOwner::close) from its own teardown path. If
/// `close` is never called, drop performs the same idempotent release as a
/// fallback, with failures logged rather than propagated (drop cannot
/// fail). An explicit `close` suppresses all fallback work.
///
/// The owner's guard is independent from the tracker's, so closing the owner
/// and releasing the tracker directly stay individually idempotent.
///
/// # Example
///
/// ```rust
/// use releasable::ScopedOwner;
///
/// struct Session {
///     scope: ScopedOwner,
/// }
///
/// impl Session {
///     fn connect() -> Self {
///         let scope = ScopedOwner::new();
///         scope.track_fn(|| println!("socket closed"));
///         Self { scope }
///     }
///
///     fn shutdown(&self) -> releasable::ReleaseResult {
///         self.scope.close()
///     }
/// }
///
/// let session = Session::connect();
/// session.shutdown()?; // children released now, drop stays quiet
/// # Ok::<(), releasable::ReleaseError>(())
/// ```
#[derive(Debug, Default)]
pub struct ScopedOwner {
    tracker: DisposalTracker,
    closed: OnceGuard,
}

impl ScopedOwner {
    /// Creates an owner with an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The owned tracker, for operations without a forwarding helper such as
    /// [`DisposalTracker::add_weak`].
    pub const fn tracker(&self) -> &DisposalTracker {
        &self.tracker
    }

    /// Registers a resource with the owned tracker and returns the handle
    /// unchanged for chaining.
    pub fn track<R>(&self, resource: Arc<R>) -> Arc<R>
    where
        R: Releasable + Send + Sync + 'static,
    {
        self.tracker.add(resource)
    }

    /// Registers a callback to run during teardown.
    pub fn track_fn<F>(&self, action: F) -> Arc<ActionResource>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tracker.add_fn(action)
    }

    /// Explicit teardown: on first call, releases the owned tracker and
    /// propagates its result. Later calls return `Ok(())` without effect.
    pub fn close(&self) -> ReleaseResult {
        if self.closed.set() {
            return Ok(());
        }
        self.tracker.release()
    }

    /// Returns whether explicit or fallback teardown has already run.
    pub fn is_closed(&self) -> bool {
        self.closed.is_set()
    }
}

impl Drop for ScopedOwner {
    fn drop(&mut self) {
        if self.closed.set() {
            return;
        }
        if !self.tracker.is_empty() {
            warn!("scoped owner dropped without an explicit close");
        }
        if let Err(err) = self.tracker.release() {
            error!(%err, "fallback close during drop reported failures");
        }
    }
}
