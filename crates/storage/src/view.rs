//! The key/value view contract and the simple views built on it.

use crate::{Entry, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Durable key/value storage.
///
/// Implementations guarantee per-key atomicity only. Values are handed
/// back exactly as written; any at-rest protection is the view's concern.
pub trait View: Send + Sync {
    /// Read the entry at `key`. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Entry>>;

    /// Write `entry`, replacing any existing value.
    fn put(&self, entry: &Entry) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Keys that start with `prefix`, with the prefix removed, in key order.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

impl<V: View + ?Sized> View for Arc<V> {
    fn get(&self, key: &str) -> Result<Option<Entry>> {
        (**self).get(key)
    }

    fn put(&self, entry: &Entry) -> Result<()> {
        (**self).put(entry)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).list(prefix)
    }
}

/// A view confined to the keys under a fixed prefix.
///
/// Keys passed in and handed out are relative to the prefix.
#[derive(Clone)]
pub struct SubView {
    inner: Arc<dyn View>,
    prefix: String,
}

impl SubView {
    pub fn new(inner: Arc<dyn View>, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A nested view under `prefix`, relative to this one.
    pub fn sub_view(&self, prefix: &str) -> SubView {
        SubView {
            inner: Arc::clone(&self.inner),
            prefix: format!("{}{}", self.prefix, prefix),
        }
    }

    fn expand(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl View for SubView {
    fn get(&self, key: &str) -> Result<Option<Entry>> {
        let entry = self.inner.get(&self.expand(key))?;
        Ok(entry.map(|e| Entry::new(key, e.value)))
    }

    fn put(&self, entry: &Entry) -> Result<()> {
        self.inner
            .put(&Entry::new(self.expand(&entry.key), entry.value.clone()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(&self.expand(key))
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.list(&self.expand(prefix))
    }
}

/// A view held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryView {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl View for InMemoryView {
    fn get(&self, key: &str) -> Result<Option<Entry>> {
        let entries = self.entries.read();
        Ok(entries.get(key).map(|value| Entry::new(key, value.clone())))
    }

    fn put(&self, entry: &Entry) -> Result<()> {
        self.entries
            .write()
            .insert(entry.key.clone(), entry.value.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read();
        let keys = entries
            .range(prefix.to_string()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .map(|key| key[prefix.len()..].to_string())
            .collect();
        Ok(keys)
    }
}
