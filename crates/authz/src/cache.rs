//! Bounded least-recently-used cache of parsed policies.

use parking_lot::Mutex;
use policy::PolicyDocument;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// LRU cache keyed by policy name.
///
/// Every operation takes the lock once, so readers never observe a
/// half-applied insert or removal.
///
/// Each name carries a generation that [`insert`](Self::insert) and
/// [`remove`](Self::remove) advance. A loader that read storage without
/// holding a store lock records the generation first and caches its
/// result with [`fill`](Self::fill), which refuses once the name has
/// been written or removed in between.
pub struct PolicyCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Slot>,
    /// Last-use stamp to name, oldest first.
    recency: BTreeMap<u64, String>,
    /// Write generation per name. Survives eviction.
    generations: HashMap<String, u64>,
    clock: u64,
}

struct Slot {
    policy: Arc<PolicyDocument>,
    stamp: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn generation(&self, name: &str) -> u64 {
        self.generations.get(name).copied().unwrap_or(0)
    }

    fn bump(&mut self, name: &str) {
        *self.generations.entry(name.to_string()).or_insert(0) += 1;
    }

    fn put(&mut self, capacity: usize, name: &str, policy: Arc<PolicyDocument>) {
        let stamp = self.tick();

        if let Some(old) = self.entries.insert(name.to_string(), Slot { policy, stamp }) {
            self.recency.remove(&old.stamp);
        } else if self.entries.len() > capacity {
            if let Some((_, oldest)) = self.recency.pop_first() {
                self.entries.remove(&oldest);
            }
        }
        self.recency.insert(stamp, name.to_string());
    }
}

impl PolicyCache {
    /// Create a cache holding at most `capacity` policies (minimum one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, name: &str) -> Option<Arc<PolicyDocument>> {
        let mut inner = self.inner.lock();
        let stamp = inner.tick();
        let slot = inner.entries.get_mut(name)?;
        let previous = std::mem::replace(&mut slot.stamp, stamp);
        let policy = Arc::clone(&slot.policy);

        inner.recency.remove(&previous);
        inner.recency.insert(stamp, name.to_string());
        Some(policy)
    }

    /// Current write generation of `name`.
    pub fn generation(&self, name: &str) -> u64 {
        self.inner.lock().generation(name)
    }

    /// Insert or replace `name` after a write, evicting the least recently
    /// used entry when full.
    pub fn insert(&self, name: &str, policy: Arc<PolicyDocument>) {
        let mut inner = self.inner.lock();
        inner.bump(name);
        inner.put(self.capacity, name, policy);
    }

    /// Cache a policy loaded from storage, unless `name` was written or
    /// removed since `generation` was read. Returns whether it was cached.
    pub fn fill(&self, name: &str, policy: Arc<PolicyDocument>, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation(name) != generation {
            return false;
        }
        inner.put(self.capacity, name, policy);
        true
    }

    pub fn remove(&self, name: &str) {
        let mut inner = self.inner.lock();
        inner.bump(name);
        if let Some(slot) = inner.entries.remove(name) {
            inner.recency.remove(&slot.stamp);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
