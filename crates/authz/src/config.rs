//! Policy store configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of parsed policies kept in the cache by default.
pub const POLICY_CACHE_SIZE: usize = 1024;

/// Policy store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Re-read and re-parse policies from storage on every lookup.
    pub caching_disabled: bool,

    /// Maximum number of cached policies.
    pub cache_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            caching_disabled: false,
            cache_size: POLICY_CACHE_SIZE,
        }
    }
}

impl StoreConfig {
    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Config(e.to_string()))
    }

    /// A configuration with caching turned off.
    pub fn uncached() -> Self {
        Self {
            caching_disabled: true,
            ..Self::default()
        }
    }

    pub fn caching_enabled(&self) -> bool {
        !self.caching_disabled && self.cache_size > 0
    }
}
