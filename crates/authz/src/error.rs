//! Policy store error types.

use thiserror::Error;

/// Policy store errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The policy name is empty or malformed.
    #[error("invalid policy name {0:?}")]
    InvalidName(String),

    /// The policy text failed to parse.
    #[error("invalid policy: {0}")]
    InvalidPolicy(#[from] policy::Error),

    /// The policy is managed by the system and cannot be changed.
    #[error("cannot modify immutable policy {0:?}")]
    ImmutablePolicy(String),

    /// The default policy may be edited but never removed.
    #[error("cannot delete the default policy")]
    ProtectedDefault,

    /// A policy requested for an ACL does not exist.
    #[error("policy {0:?} not found")]
    PolicyNotFound(String),

    /// A policy requested for an ACL could not be loaded.
    #[error("failed to get policy {name:?}: {source}")]
    PolicyLookup {
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// The underlying view failed.
    #[error(transparent)]
    Storage(#[from] storage::Error),

    /// A stored policy could not be decoded in either encoding.
    #[error("failed to decode stored policy {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: policy::Error,
    },

    /// A stored policy carries a version this build does not understand.
    #[error("stored policy {name:?} has unsupported version {version}")]
    UnsupportedVersion { name: String, version: u32 },

    /// A required system policy could not be ensured at setup.
    #[error("failed to set up {policy} policy: {source}")]
    Bootstrap {
        policy: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// The store configuration is invalid.
    #[error("invalid store config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
