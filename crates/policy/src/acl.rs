//! ACL construction and lookup.
//!
//! An [`Acl`] is the merge of one or more policies. Exact patterns and
//! glob prefixes live in separate tables. For a request path the exact
//! entry wins outright; otherwise the longest matching glob prefix wins.
//! Entries from different tiers are never combined.

use crate::{Capability, CapabilitySet, Error, PolicyDocument, Result, SystemPolicy};
use std::collections::HashMap;

/// Resolved capabilities for one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AclEntry {
    pub capabilities: CapabilitySet,
    pub sudo: bool,
}

impl AclEntry {
    fn merge(self, capabilities: CapabilitySet) -> Self {
        let capabilities = self.capabilities.merge(capabilities);
        Self {
            capabilities,
            sudo: capabilities.contains(Capability::Sudo),
        }
    }
}

/// Result of an ACL lookup for a concrete path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolved {
    /// Capabilities from the winning entry. A deny-only entry yields `[deny]`.
    pub capabilities: CapabilitySet,
    pub sudo: bool,
}

impl Resolved {
    /// Capabilities the caller may exercise. Empty means no access.
    pub fn granted(&self) -> CapabilitySet {
        self.capabilities.granted()
    }

    pub fn allows(&self, cap: Capability) -> bool {
        cap != Capability::Deny && self.granted().contains(cap)
    }
}

/// Merged access control list.
#[derive(Debug, Clone, Default)]
pub struct Acl {
    exact: HashMap<String, AclEntry>,
    glob: HashMap<String, AclEntry>,
    root: bool,
}

impl Acl {
    /// Merge the given policies into one ACL.
    ///
    /// Any policy named `root` makes the ACL unrestricted, regardless of
    /// what else is merged with it. A `deny` on a pattern from any policy
    /// vetoes every grant for that same pattern.
    pub fn new<'a, I>(policies: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a PolicyDocument>,
    {
        let policies: Vec<&PolicyDocument> = policies.into_iter().collect();

        if policies
            .iter()
            .any(|p| p.name() == SystemPolicy::Root.name())
        {
            return Ok(Self {
                root: true,
                ..Self::default()
            });
        }

        let mut acl = Self::default();
        for policy in policies {
            for rule in &policy.paths {
                if rule.capabilities.is_empty() {
                    return Err(Error::Invalid(format!(
                        "policy {:?} path {:?} has no capabilities",
                        policy.name(),
                        rule.pattern
                    )));
                }

                let table = if rule.glob {
                    &mut acl.glob
                } else {
                    &mut acl.exact
                };
                let entry = table.entry(rule.prefix.clone()).or_default();
                *entry = entry.merge(rule.capabilities);
            }
        }

        Ok(acl)
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Resolve the capabilities granted on `path`.
    pub fn capabilities(&self, path: &str) -> Resolved {
        if self.root {
            return Resolved {
                capabilities: CapabilitySet::granting(),
                sudo: true,
            };
        }

        let path = path.trim_start_matches('/');
        let entry = self
            .exact
            .get(path)
            .or_else(|| self.longest_glob(path))
            .copied()
            .unwrap_or_default();

        Resolved {
            capabilities: entry.capabilities,
            sudo: entry.sudo && !entry.capabilities.is_deny(),
        }
    }

    /// Whether `cap` is granted on `path`.
    pub fn allows(&self, path: &str, cap: Capability) -> bool {
        self.capabilities(path).allows(cap)
    }

    /// Whether `path` may be used for sudo-protected operations.
    pub fn is_sudo(&self, path: &str) -> bool {
        self.capabilities(path).sudo
    }

    fn longest_glob(&self, path: &str) -> Option<&AclEntry> {
        if self.glob.is_empty() {
            return None;
        }
        (0..=path.len())
            .rev()
            .filter(|i| path.is_char_boundary(*i))
            .find_map(|i| self.glob.get(&path[..i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathRule;
    use proptest::prelude::*;

    fn policy(name: &str, text: &str) -> PolicyDocument {
        PolicyDocument::parse(text).unwrap().named(name)
    }

    fn caps(list: &[Capability]) -> CapabilitySet {
        list.iter().copied().collect()
    }

    #[test]
    fn test_root_short_circuits() {
        let deny_all = policy("locked", "[path.\"*\"]\ncapabilities = [\"deny\"]\n");
        let root = PolicyDocument::root();
        let acl = Acl::new([&deny_all, &root]).unwrap();

        assert!(acl.is_root());
        let resolved = acl.capabilities("anything/at/all");
        assert_eq!(resolved.capabilities, CapabilitySet::granting());
        assert!(resolved.sudo);
    }

    #[test]
    fn test_no_policies_grants_nothing() {
        let acl = Acl::new(std::iter::empty()).unwrap();
        assert!(!acl.is_root());
        assert!(acl.capabilities("secret/foo").capabilities.is_empty());
        assert!(!acl.allows("secret/foo", Capability::Read));
    }

    #[test]
    fn test_deny_overrides_grant_in_any_order() {
        let a = policy("a", "[path.\"secret/*\"]\ncapabilities = [\"read\"]\n");
        let b = policy("b", "[path.\"secret/*\"]\ncapabilities = [\"deny\"]\n");

        for acl in [Acl::new([&a, &b]).unwrap(), Acl::new([&b, &a]).unwrap()] {
            let resolved = acl.capabilities("secret/foo");
            assert!(resolved.capabilities.is_deny());
            assert!(resolved.granted().is_empty());
            assert!(!resolved.sudo);
        }
    }

    #[test]
    fn test_deny_is_per_pattern() {
        let a = policy(
            "a",
            "[path.\"secret/*\"]\ncapabilities = [\"deny\"]\n\n[path.\"secret/open\"]\ncapabilities = [\"read\"]\n",
        );
        let acl = Acl::new([&a]).unwrap();
        assert!(acl.allows("secret/open", Capability::Read));
        assert!(!acl.allows("secret/closed", Capability::Read));
    }

    #[test]
    fn test_exact_wins_over_glob() {
        let a = policy("a", "[path.\"secret/*\"]\ncapabilities = [\"read\"]\n");
        let b = policy("b", "[path.\"secret/x\"]\ncapabilities = [\"create\"]\n");
        let acl = Acl::new([&a, &b]).unwrap();

        assert_eq!(acl.capabilities("secret/x").capabilities, caps(&[Capability::Create]));
        assert_eq!(acl.capabilities("secret/y").capabilities, caps(&[Capability::Read]));
    }

    #[test]
    fn test_longest_glob_wins() {
        let a = policy(
            "a",
            r#"
[path."*"]
capabilities = ["list"]

[path."secret/*"]
capabilities = ["read"]

[path."secret/team/*"]
capabilities = ["update"]
"#,
        );
        let acl = Acl::new([&a]).unwrap();

        assert_eq!(acl.capabilities("sys/health").capabilities, caps(&[Capability::List]));
        assert_eq!(acl.capabilities("secret/foo").capabilities, caps(&[Capability::Read]));
        assert_eq!(
            acl.capabilities("secret/team/db").capabilities,
            caps(&[Capability::Update])
        );
    }

    #[test]
    fn test_grants_union_for_same_pattern() {
        let a = policy("a", "[path.\"secret/*\"]\ncapabilities = [\"read\"]\n");
        let b = policy("b", "[path.\"secret/*\"]\ncapabilities = [\"list\", \"sudo\"]\n");
        let acl = Acl::new([&a, &b]).unwrap();

        let resolved = acl.capabilities("secret/foo");
        assert_eq!(
            resolved.capabilities,
            caps(&[Capability::Read, Capability::List, Capability::Sudo])
        );
        assert!(resolved.sudo);
        assert!(acl.is_sudo("secret/foo"));
        assert!(!acl.is_sudo("other"));
    }

    #[test]
    fn test_exact_and_glob_namespaces_are_separate() {
        let a = policy(
            "a",
            "[path.\"secret\"]\ncapabilities = [\"list\"]\n\n[path.\"secret*\"]\ncapabilities = [\"read\"]\n",
        );
        let acl = Acl::new([&a]).unwrap();
        assert_eq!(acl.capabilities("secret").capabilities, caps(&[Capability::List]));
        assert_eq!(acl.capabilities("secretive").capabilities, caps(&[Capability::Read]));
    }

    #[test]
    fn test_legacy_glob_matches_by_prefix() {
        let mut a = policy("a", "[path.\"secret\"]\ncapabilities = [\"read\"]\n");
        a.mark_legacy_glob();
        let acl = Acl::new([&a]).unwrap();
        assert!(acl.allows("secret", Capability::Read));
        assert!(acl.allows("secret/foo", Capability::Read));
    }

    #[test]
    fn test_empty_rule_is_invalid() {
        let mut doc = PolicyDocument::default().named("broken");
        doc.paths.push(PathRule::new("a", CapabilitySet::empty()));
        assert!(matches!(Acl::new([&doc]).unwrap_err(), Error::Invalid(_)));
    }

    fn arb_grant() -> impl Strategy<Value = Capability> {
        prop::sample::select(vec![
            Capability::Create,
            Capability::Read,
            Capability::Update,
            Capability::Delete,
            Capability::List,
            Capability::Sudo,
        ])
    }

    proptest! {
        /// A single deny on a pattern vetoes all grants, wherever it appears.
        #[test]
        fn prop_deny_wins_regardless_of_order(
            grants in prop::collection::vec(prop::collection::vec(arb_grant(), 1..4), 0..6),
            deny_at in any::<prop::sample::Index>(),
        ) {
            let mut docs: Vec<PolicyDocument> = grants
                .iter()
                .enumerate()
                .map(|(i, list)| {
                    let mut doc = PolicyDocument::default().named(format!("p{i}"));
                    doc.paths.push(PathRule::new("secret/*", list.iter().copied().collect()));
                    doc
                })
                .collect();
            let mut deny = PolicyDocument::default().named("deny");
            deny.paths.push(PathRule::new("secret/*", CapabilitySet::deny()));
            docs.insert(deny_at.index(docs.len() + 1), deny);

            let acl = Acl::new(&docs).unwrap();
            let resolved = acl.capabilities("secret/anything");
            prop_assert!(resolved.capabilities.is_deny());
            prop_assert!(resolved.granted().is_empty());
            prop_assert!(!resolved.sudo);
        }
    }
}
