//! Resource-lifecycle toolkit built around a single capability: release
//! exactly once, in a controlled order, no matter how often or from how many
//! threads release is requested.
//!
//! The crate provides four cooperating primitives:
//!
//! - [`OnceGuard`]: an atomic flag that can be set exactly once; the building
//!   block every other primitive uses to make release idempotent.
//! - [`ActionResource`]: adapts a zero-argument callback into a releasable
//!   resource that runs the callback at most once.
//! - [`WeakResource`]: a releasable adapter that only observes its target;
//!   releasing after the target is gone is a defined success, not an error.
//! - [`DisposalTracker`]: aggregates many releasable resources and releases
//!   them in reverse registration order, exactly once.
//!
//! [`ScopedOwner`] ties these together for types that own a tracker and want
//! "release tracked children on teardown" for free, with drop as the
//! fallback path when no explicit close happened.
//!
//! # Example
//!
//! ```rust
//! use releasable::DisposalTracker;
//!
//! let tracker = DisposalTracker::new();
//! tracker.add_fn(|| println!("released second"));
//! tracker.add_fn(|| println!("released first"));
//!
//! // Reverse registration order: teardown mirrors stack unwinding.
//! tracker.release()?;
//!
//! // Releasing again is a no-op.
//! tracker.release()?;
//! # Ok::<(), releasable::ReleaseError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod errors;
pub mod guard;
pub mod scope;
pub mod tracker;
pub mod weak;

use std::sync::Arc;

pub use action::ActionResource;
pub use errors::{ReleaseError, ReleaseResult};
pub use guard::OnceGuard;
pub use scope::ScopedOwner;
pub use tracker::DisposalTracker;
pub use weak::WeakResource;

/// The capability every tracked resource exposes: a single idempotent
/// teardown operation.
///
/// `release` takes `&self` so a shared handle can be released from any
/// holder; implementations must make repeated calls a no-op after the first
/// (typically via [`OnceGuard`]). Failures propagate as [`ReleaseError`] and
/// are never swallowed by this crate, with one deliberate exception: a
/// [`WeakResource`] whose target is already gone reports success.
pub trait Releasable {
    /// Releases the resource. Only the first call may have an effect.
    fn release(&self) -> ReleaseResult;
}

/// A shared handle to any releasable resource, as stored by
/// [`DisposalTracker`].
pub type SharedReleasable = Arc<dyn Releasable + Send + Sync>;
