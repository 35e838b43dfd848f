//! Set-exactly-once atomic guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// An atomic flag that can be set exactly once over its lifetime.
///
/// [`set`](OnceGuard::set) returns `false` for the single call that performs
/// the unset-to-set transition and `true` for every call after it. This is
/// the leaf primitive behind every idempotent release path in this crate:
/// the first caller does the work, everyone else backs off.
///
/// The guard is never reset.
#[derive(Debug, Default)]
pub struct OnceGuard {
    set: AtomicBool,
}

impl OnceGuard {
    /// Creates a guard in the unset state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            set: AtomicBool::new(false),
        }
    }

    /// Attempts the unset-to-set transition.
    ///
    /// Returns `false` if this call won the transition and `true` if the
    /// guard was already set. Under concurrent callers exactly one observes
    /// `false`; the compare-and-swap also orders the winner's subsequent
    /// work before any loser's observation of the set state.
    pub fn set(&self) -> bool {
        self.set
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
    }

    /// Returns whether the guard has been set, without setting it.
    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }
}
