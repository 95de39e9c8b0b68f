//! Policy documents and the policy text parser.

use crate::{Capability, CapabilitySet, Error, Result};
use serde::Deserialize;

/// A parsed policy: a name plus an ordered list of path rules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyDocument {
    name: String,

    /// Path rules in source order.
    pub paths: Vec<PathRule>,

    /// The text this document was parsed from.
    pub raw: String,
}

/// One path block: a pattern and the capabilities it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRule {
    /// Pattern as written in the policy.
    pub pattern: String,

    /// Pattern with any trailing `*` removed. This is the match key.
    pub prefix: String,

    /// Whether the rule matches by prefix rather than exactly.
    pub glob: bool,

    pub capabilities: CapabilitySet,
}

impl PathRule {
    pub fn new(pattern: impl Into<String>, capabilities: CapabilitySet) -> Self {
        let pattern = pattern.into();
        let trimmed = pattern.trim_start_matches('/');
        let (prefix, glob) = match trimmed.strip_suffix('*') {
            Some(prefix) => (prefix.to_string(), true),
            None => (trimmed.to_string(), false),
        };
        Self {
            pattern,
            prefix,
            glob,
            capabilities,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPolicy {
    #[serde(default)]
    path: toml::Table,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPathBlock {
    capabilities: Option<Vec<String>>,
    policy: Option<String>,
}

impl PolicyDocument {
    /// Parse policy text. The returned document has no name.
    ///
    /// Policy text is TOML with one `[path."<pattern>"]` table per rule:
    ///
    /// ```
    /// let doc = policy::PolicyDocument::parse(r#"
    /// [path."secret/*"]
    /// capabilities = ["read", "list"]
    /// "#)?;
    /// assert_eq!(doc.paths.len(), 1);
    /// assert!(doc.paths[0].glob);
    /// # Ok::<(), policy::Error>(())
    /// ```
    ///
    /// A pattern defined twice in one document is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawPolicy = toml::from_str(text).map_err(|e| Error::Parse(e.to_string()))?;

        let mut paths = Vec::with_capacity(raw.path.len());
        for (pattern, value) in raw.path {
            if pattern.trim_start_matches('/').is_empty() {
                return Err(Error::MalformedPath {
                    path: pattern,
                    reason: "empty path".to_string(),
                });
            }
            let block = RawPathBlock::deserialize(value).map_err(|e: toml::de::Error| {
                Error::MalformedPath {
                    path: pattern.clone(),
                    reason: e.message().to_string(),
                }
            })?;
            let capabilities = block_capabilities(&block)?;
            if capabilities.is_empty() {
                return Err(Error::MissingCapabilities(pattern));
            }
            paths.push(PathRule::new(pattern, capabilities));
        }

        Ok(Self {
            name: String::new(),
            paths,
            raw: text.to_string(),
        })
    }

    /// The synthesized root policy. It has no rules; its name alone grants
    /// everything when merged into an ACL.
    pub fn root() -> Self {
        Self::default().named(crate::SystemPolicy::Root.name())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assign the document's name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Treat every rule as a prefix match.
    ///
    /// Entries written before the versioned encoding matched every path
    /// by prefix, whether or not it ended in `*`.
    pub fn mark_legacy_glob(&mut self) {
        for rule in &mut self.paths {
            rule.glob = true;
        }
    }
}

fn block_capabilities(block: &RawPathBlock) -> Result<CapabilitySet> {
    let mut set = CapabilitySet::empty();
    if let Some(level) = &block.policy {
        set = set.merge(level_capabilities(level)?);
    }
    for token in block.capabilities.iter().flatten() {
        set.insert(token.parse::<Capability>()?);
    }
    Ok(set)
}

/// Capabilities implied by the older `policy = "<level>"` shorthand.
fn level_capabilities(level: &str) -> Result<CapabilitySet> {
    use Capability::*;

    let caps: &[Capability] = match level {
        "deny" => &[Deny],
        "read" => &[Read, List],
        "write" => &[Create, Read, Update, Delete, List],
        "sudo" => &[Create, Read, Update, Delete, List, Sudo],
        other => return Err(Error::UnknownCapability(other.to_string())),
    };
    Ok(caps.iter().copied().collect())
}
