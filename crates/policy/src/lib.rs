//! Path-based capability policies and ACL evaluation.
//!
//! A policy grants capabilities on path patterns. Patterns are exact, or
//! end in `*` to match by prefix. Any number of named policies merge into
//! an [`Acl`], which answers "what may this caller do on this path".
//!
//! ```
//! use policy::{Acl, Capability, PolicyDocument};
//!
//! let dev = PolicyDocument::parse(r#"
//! [path."secret/dev/*"]
//! capabilities = ["read", "list"]
//! "#)?.named("dev");
//!
//! let acl = Acl::new([&dev])?;
//! assert!(acl.allows("secret/dev/db", Capability::Read));
//! assert!(!acl.allows("secret/prod/db", Capability::Read));
//! # Ok::<(), policy::Error>(())
//! ```

mod acl;
mod capability;
mod error;
mod policy;
pub mod system;

pub use acl::{Acl, AclEntry, Resolved};
pub use capability::{Capability, CapabilitySet};
pub use error::{Error, Result};
pub use policy::{PathRule, PolicyDocument};
pub use system::SystemPolicy;
