//! Error types for resource release.
//!
//! Argument validation errors do not exist in this crate: callbacks and
//! resource handles cannot be absent, so nothing is left to validate. What
//! remains is the failure of a resource's own teardown, either alone or
//! aggregated across a tracker release.

use thiserror::Error;

/// Errors that can occur while releasing a resource.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// A resource's own release failed.
    #[error("resource release failed: {0}")]
    ReleaseFailed(String),

    /// Two or more tracked resources failed during a single tracker release.
    ///
    /// Every tracked resource was still released; this carries the full set
    /// of failures in the order they were encountered (reverse registration
    /// order), and the display message lists every one of them.
    #[error("{} tracked resources failed to release: {}", .0.len(), describe_failures(.0))]
    Aggregate(Vec<ReleaseError>),
}

/// Result alias for release operations.
pub type ReleaseResult = Result<(), ReleaseError>;

fn describe_failures(failures: &[ReleaseError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ReleaseError {
    /// Creates a [`ReleaseError::ReleaseFailed`] from any displayable context.
    ///
    /// Convenience for [`Releasable`](crate::Releasable) implementations and
    /// fallible release callbacks.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::ReleaseFailed(message.into())
    }

    /// Collapses the failures collected during one tracker release.
    ///
    /// No failures is success, a single failure surfaces unchanged, and two
    /// or more become [`ReleaseError::Aggregate`].
    pub(crate) fn collect(mut failures: Vec<Self>) -> ReleaseResult {
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(Self::Aggregate(failures)),
        }
    }
}
