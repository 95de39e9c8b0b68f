//! Key/value views for durable state.
//!
//! A [`View`] is the narrow storage contract the rest of the workspace
//! persists through: get, put, delete and prefix listing over string keys
//! with opaque byte values.
//!
//! # Views
//!
//! - [`SqliteView`]: a single SQLite table, for durable deployments.
//! - [`InMemoryView`]: a sorted map, for tests and ephemeral use.
//! - [`SubView`]: confines another view to the keys under a prefix, so
//!   each component owns its own namespace.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use storage::{Entry, InMemoryView, SubView, View};
//!
//! let root: Arc<dyn View> = Arc::new(InMemoryView::new());
//! let policies = SubView::new(root.clone(), "sys/policy/");
//!
//! policies.put(&Entry::new("dev", "[path.\"secret/*\"]"))?;
//! assert!(root.get("sys/policy/dev")?.is_some());
//! assert_eq!(policies.list("")?, ["dev"]);
//! # Ok::<(), storage::Error>(())
//! ```

mod entry;
mod error;
mod sqlite;
mod view;

pub use entry::Entry;
pub use error::{Error, Result};
pub use sqlite::SqliteView;
pub use view::{InMemoryView, SubView, View};
