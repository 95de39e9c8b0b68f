//! Policies with fixed names and lifecycle rules.

/// Name of the universal-access policy.
pub const ROOT_POLICY_NAME: &str = "root";

/// Name of the policy attached to every token unless opted out.
pub const DEFAULT_POLICY_NAME: &str = "default";

/// Name of the policy that keeps wrapped-response retrieval reachable.
pub const RESPONSE_WRAPPING_POLICY_NAME: &str = "response-wrapping";

/// Built-in text of the `default` policy.
pub const DEFAULT_POLICY: &str = r#"
# Allow tokens to look up their own properties
[path."auth/token/lookup-self"]
capabilities = ["read"]

# Allow tokens to renew themselves
[path."auth/token/renew-self"]
capabilities = ["update"]

# Allow tokens to revoke themselves
[path."auth/token/revoke-self"]
capabilities = ["update"]

# Private scratch storage for the token
[path."cubbyhole/*"]
capabilities = ["create", "read", "update", "delete", "list"]

[path."cubbyhole"]
capabilities = ["list"]

# Allow a token to inspect its own capabilities
[path."sys/capabilities-self"]
capabilities = ["update"]

# Allow renewal of leases
[path."sys/renew"]
capabilities = ["update"]

[path."sys/renew/*"]
capabilities = ["update"]
"#;

/// Built-in text of the `response-wrapping` policy. Stored copies must
/// match this byte for byte.
pub const RESPONSE_WRAPPING_POLICY: &str = r#"
[path."cubbyhole/response"]
capabilities = ["create", "read"]
"#;

/// The policies the store treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemPolicy {
    /// Never persisted. Its presence in a merge grants everything.
    Root,
    /// Always present; may be edited but not removed.
    Default,
    /// Always present and pinned to its template; internal use only.
    ResponseWrapping,
}

impl SystemPolicy {
    pub const ALL: [SystemPolicy; 3] = [
        SystemPolicy::Root,
        SystemPolicy::Default,
        SystemPolicy::ResponseWrapping,
    ];

    /// Look up a system policy by (already normalised) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SystemPolicy::Root => ROOT_POLICY_NAME,
            SystemPolicy::Default => DEFAULT_POLICY_NAME,
            SystemPolicy::ResponseWrapping => RESPONSE_WRAPPING_POLICY_NAME,
        }
    }

    /// Immutable policies cannot be written or deleted through the store.
    pub fn is_immutable(&self) -> bool {
        matches!(self, SystemPolicy::Root | SystemPolicy::ResponseWrapping)
    }

    /// Assignable policies appear in listings meant for end users.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, SystemPolicy::ResponseWrapping)
    }

    pub fn is_deletable(&self) -> bool {
        !self.is_immutable() && !matches!(self, SystemPolicy::Default)
    }

    /// Text the store bootstraps this policy from, if any.
    pub fn template(&self) -> Option<&'static str> {
        match self {
            SystemPolicy::Root => None,
            SystemPolicy::Default => Some(DEFAULT_POLICY),
            SystemPolicy::ResponseWrapping => Some(RESPONSE_WRAPPING_POLICY),
        }
    }

    /// Whether the stored copy must equal the template exactly.
    pub fn is_pinned(&self) -> bool {
        matches!(self, SystemPolicy::ResponseWrapping)
    }
}

/// Whether `name` may be mutated through the public store API.
pub fn is_immutable(name: &str) -> bool {
    SystemPolicy::from_name(name).is_some_and(|p| p.is_immutable())
}

/// Whether `name` may be offered for assignment.
pub fn is_assignable(name: &str) -> bool {
    SystemPolicy::from_name(name).is_none_or(|p| p.is_assignable())
}
