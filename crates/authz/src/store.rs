//! Durable, cached storage of named policies.

use crate::{Error, PolicyCache, Result, StoreConfig};
use parking_lot::Mutex;
use policy::{Acl, PolicyDocument, SystemPolicy, system};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{Entry, SubView, View};
use tracing::{debug, info, warn};

/// Sub-path of the system view that holds policies.
pub const POLICY_SUB_PATH: &str = "policy/";

/// Encoding version written for every stored policy.
const POLICY_ENTRY_VERSION: u32 = 2;

/// Stored form of a policy.
///
/// Entries written before versioning hold the policy text directly, with
/// no wrapper.
#[derive(Debug, Serialize, Deserialize)]
struct PolicyEntry {
    version: u32,
    raw: String,
}

/// Durable store of named policies, and the source of ACLs built from them.
pub struct PolicyStore {
    view: Arc<dyn View>,
    cache: Option<PolicyCache>,
    /// Held across a write to storage and the matching cache update.
    writes: Mutex<()>,
}

impl PolicyStore {
    /// Create a store over a view that already holds only policies.
    ///
    /// No system policies are created; use [`PolicyStore::setup`] for a
    /// store that is ready to serve requests.
    pub fn new(view: Arc<dyn View>, config: &StoreConfig) -> Self {
        let cache = config
            .caching_enabled()
            .then(|| PolicyCache::new(config.cache_size));
        Self {
            view,
            cache,
            writes: Mutex::new(()),
        }
    }

    /// Bring up the store under `system_view`.
    ///
    /// Ensures `default` exists and `response-wrapping` matches its
    /// built-in text. Both checks run on every setup, since storage may
    /// have been written by older software.
    pub fn setup(system_view: Arc<dyn View>, config: &StoreConfig) -> Result<Self> {
        let view = SubView::new(system_view, POLICY_SUB_PATH);
        let store = Self::new(Arc::new(view), config);
        store.ensure_system_policies()?;
        Ok(store)
    }

    fn ensure_system_policies(&self) -> Result<()> {
        for policy in SystemPolicy::ALL {
            let Some(template) = policy.template() else {
                continue;
            };
            let bootstrap = |source: Error| Error::Bootstrap {
                policy: policy.name(),
                source: Box::new(source),
            };

            let existing = self.get_policy(policy.name()).map_err(bootstrap)?;
            let rewrite = match &existing {
                None => {
                    info!(policy = policy.name(), "creating missing system policy");
                    true
                }
                Some(stored) if policy.is_pinned() && stored.raw != template => {
                    warn!(policy = policy.name(), "system policy drifted from built-in, restoring");
                    true
                }
                Some(_) => false,
            };

            if rewrite {
                let doc = PolicyDocument::parse(template)
                    .map_err(|e| bootstrap(e.into()))?
                    .named(policy.name());
                self.set_policy_internal(doc).map_err(bootstrap)?;
            }
        }
        Ok(())
    }

    /// Fetch the named policy. A policy that does not exist is `Ok(None)`.
    pub fn get_policy(&self, name: &str) -> Result<Option<Arc<PolicyDocument>>> {
        let name = normalize_name(name);

        let mut generation = 0;
        if let Some(cache) = &self.cache {
            if let Some(policy) = cache.get(&name) {
                debug!(policy = %name, "policy cache hit");
                return Ok(Some(policy));
            }
            generation = cache.generation(&name);
        }

        // Root is never stored.
        if name == SystemPolicy::Root.name() {
            let policy = Arc::new(PolicyDocument::root());
            self.cache_fill(&name, &policy, generation);
            return Ok(Some(policy));
        }

        debug!(policy = %name, "loading policy from storage");
        let Some(entry) = self.view.get(&name)? else {
            return Ok(None);
        };

        let policy = Arc::new(decode_entry(&name, &entry)?);
        self.cache_fill(&name, &policy, generation);
        Ok(Some(policy))
    }

    /// Create or replace a policy.
    ///
    /// The document's `raw` text is what gets stored; it is parsed again
    /// here so the cached copy is exactly what a later load would produce.
    pub fn set_policy(&self, policy: PolicyDocument) -> Result<()> {
        let name = normalize_name(policy.name());
        validate_name(&name)?;
        if system::is_immutable(&name) {
            return Err(Error::ImmutablePolicy(name));
        }

        let doc = PolicyDocument::parse(&policy.raw)?.named(name);
        self.set_policy_internal(doc)
    }

    fn set_policy_internal(&self, policy: PolicyDocument) -> Result<()> {
        let entry = Entry::json(
            policy.name(),
            &PolicyEntry {
                version: POLICY_ENTRY_VERSION,
                raw: policy.raw.clone(),
            },
        )?;

        let _guard = self.writes.lock();
        self.view.put(&entry)?;
        debug!(policy = policy.name(), "policy stored");

        if let Some(cache) = &self.cache {
            let name = policy.name().to_string();
            cache.insert(&name, Arc::new(policy));
        }
        Ok(())
    }

    /// Delete a policy. Deleting a policy that does not exist succeeds.
    pub fn delete_policy(&self, name: &str) -> Result<()> {
        let name = normalize_name(name);
        if let Some(system) = SystemPolicy::from_name(&name) {
            if system.is_immutable() {
                return Err(Error::ImmutablePolicy(name));
            }
            if !system.is_deletable() {
                return Err(Error::ProtectedDefault);
            }
        }

        let _guard = self.writes.lock();
        self.view.delete(&name)?;
        if let Some(cache) = &self.cache {
            cache.remove(&name);
        }
        debug!(policy = %name, "policy deleted");
        Ok(())
    }

    /// Names of all stored policies that may be assigned, sorted.
    pub fn list_policies(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .view
            .list("")?
            .into_iter()
            .filter(|name| system::is_assignable(name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Build an ACL from the named policies.
    ///
    /// Every name must resolve; a missing policy fails the whole call.
    pub fn acl<I, S>(&self, names: I) -> Result<Acl>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policies = Vec::new();
        for name in names {
            let name = name.as_ref();
            let policy = self
                .get_policy(name)
                .map_err(|source| Error::PolicyLookup {
                    name: name.to_string(),
                    source: Box::new(source),
                })?
                .ok_or_else(|| Error::PolicyNotFound(name.to_string()))?;
            policies.push(policy);
        }

        Ok(Acl::new(policies.iter().map(|p| &**p))?)
    }

    /// Number of cached policies. Zero when caching is disabled.
    pub fn cache_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.len())
    }

    fn cache_fill(&self, name: &str, policy: &Arc<PolicyDocument>, generation: u64) {
        if let Some(cache) = &self.cache {
            if !cache.fill(name, Arc::clone(policy), generation) {
                debug!(policy = %name, "policy changed while loading, not cached");
            }
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Decode a stored policy.
///
/// Versioned entries are tried first. Anything that is not a version
/// wrapper is policy text from before versioning, which matched every
/// path by prefix.
fn decode_entry(name: &str, entry: &Entry) -> Result<PolicyDocument> {
    let decode = |source: policy::Error| Error::Decode {
        name: name.to_string(),
        source,
    };

    match entry.decode_json::<PolicyEntry>() {
        Ok(stored) => {
            if stored.version != POLICY_ENTRY_VERSION {
                return Err(Error::UnsupportedVersion {
                    name: name.to_string(),
                    version: stored.version,
                });
            }
            let policy = PolicyDocument::parse(&stored.raw).map_err(decode)?;
            Ok(policy.named(name))
        }
        Err(_) => {
            warn!(policy = name, "policy stored without version, reading legacy encoding");
            let text = entry
                .as_str()
                .map_err(|e| decode(policy::Error::Parse(e.to_string())))?;
            let mut policy = PolicyDocument::parse(text).map_err(decode)?;
            policy.mark_legacy_glob();
            Ok(policy.named(name))
        }
    }
}
