//! Typed errors for the outline engine and its navigation boundary.

use thiserror::Error;

/// Result type for outline operations.
pub type Result<T> = std::result::Result<T, OutlineError>;

#[derive(Error, Debug)]
pub enum OutlineError {
    /// The id is not part of this outline (never minted, or minted by an earlier build).
    #[error("outline node not found: {id}")]
    NotFound { id: String },

    #[error("outline serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure surfaced to the user when a navigation request cannot be carried out.
#[derive(Error, Debug)]
pub enum NavigationError {
    /// The outline entry no longer exists in the current build. Not retried.
    #[error("navigation target no longer available: {id}")]
    TargetUnavailable { id: String },

    #[error("host navigation failed for {target}: {message}")]
    Bridge { target: String, message: String },
}
