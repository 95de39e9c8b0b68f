//! Policy error types.

use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The policy text is not valid policy syntax.
    #[error("failed to parse policy: {0}")]
    Parse(String),

    /// A path block has the wrong shape.
    #[error("malformed path block {path:?}: {reason}")]
    MalformedPath { path: String, reason: String },

    /// A path block grants nothing.
    #[error("path {0:?} has no capabilities")]
    MissingCapabilities(String),

    /// A capability or policy level token is not recognised.
    #[error("unknown capability {0:?}")]
    UnknownCapability(String),

    /// A policy reached the ACL builder in a state the parser never produces.
    #[error("invalid policy: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, Error>;
