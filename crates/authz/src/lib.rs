//! Named policy storage and ACL resolution.
//!
//! The [`PolicyStore`] persists policies by name through a
//! [`storage::View`], keeps recently used ones parsed in a bounded cache,
//! and merges any set of names into a [`policy::Acl`].
//!
//! Some names are reserved:
//!
//! - `root` is never stored. Resolving it yields an empty policy whose
//!   presence in an ACL grants everything.
//! - `default` is created at setup if missing. It can be edited but not
//!   deleted.
//! - `response-wrapping` is restored to its built-in text at every setup,
//!   cannot be changed, and is never listed for assignment.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use authz::{PolicyStore, StoreConfig};
//! use policy::{Capability, PolicyDocument};
//! use storage::InMemoryView;
//!
//! let store = PolicyStore::setup(Arc::new(InMemoryView::new()), &StoreConfig::default())?;
//!
//! let dev = PolicyDocument::parse(r#"
//! [path."secret/dev/*"]
//! capabilities = ["read", "list"]
//! "#)?.named("dev");
//! store.set_policy(dev)?;
//!
//! let acl = store.acl(["default", "dev"])?;
//! assert!(acl.allows("secret/dev/db", Capability::Read));
//! assert!(acl.allows("cubbyhole/notes", Capability::Create));
//! assert_eq!(store.list_policies()?, ["default", "dev"]);
//! # Ok::<(), authz::Error>(())
//! ```

mod cache;
mod config;
mod error;
mod store;

pub use cache::PolicyCache;
pub use config::{POLICY_CACHE_SIZE, StoreConfig};
pub use error::{Error, Result};
pub use store::{POLICY_SUB_PATH, PolicyStore};
