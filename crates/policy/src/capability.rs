//! Capability tokens and capability sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Capability tokens that a path rule can grant or deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Create,
    Read,
    Update,
    Delete,
    List,
    Sudo,
    Deny,
}

impl Capability {
    /// Every capability, in bit order.
    pub const ALL: [Capability; 7] = [
        Capability::Create,
        Capability::Read,
        Capability::Update,
        Capability::Delete,
        Capability::List,
        Capability::Sudo,
        Capability::Deny,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::Read => "read",
            Capability::Update => "update",
            Capability::Delete => "delete",
            Capability::List => "list",
            Capability::Sudo => "sudo",
            Capability::Deny => "deny",
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownCapability(s.to_string()))
    }
}

/// A set of capabilities, stored as a bitmask.
///
/// A set holding [`Capability::Deny`] is always deny-only: inserting deny
/// clears every grant, and grants are ignored once deny is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every granting capability, including sudo. Never includes deny.
    pub fn granting() -> Self {
        Capability::ALL
            .into_iter()
            .filter(|c| *c != Capability::Deny)
            .collect()
    }

    /// The deny-only set.
    pub fn deny() -> Self {
        Self(Capability::Deny.bit())
    }

    pub fn insert(&mut self, cap: Capability) {
        if cap == Capability::Deny {
            self.0 = cap.bit();
        } else if !self.is_deny() {
            self.0 |= cap.bit();
        }
    }

    pub fn contains(&self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_deny(&self) -> bool {
        self.contains(Capability::Deny)
    }

    /// Union of two sets, with deny on either side winning.
    pub fn merge(self, other: CapabilitySet) -> CapabilitySet {
        if self.is_deny() || other.is_deny() {
            CapabilitySet::deny()
        } else {
            CapabilitySet(self.0 | other.0)
        }
    }

    /// The capabilities this set actually grants. Empty for a deny-only set.
    pub fn granted(&self) -> CapabilitySet {
        if self.is_deny() {
            CapabilitySet::empty()
        } else {
            *self
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + use<> {
        let bits = self.0;
        Capability::ALL
            .into_iter()
            .filter(move |c| bits & c.bit() != 0)
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::empty();
        for cap in iter {
            set.insert(cap);
        }
        set
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
