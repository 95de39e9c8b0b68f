//! Storage entries.

use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A key and its opaque value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: Vec<u8>,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build an entry whose value is `value` encoded as JSON.
    pub fn json<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Result<Self> {
        Ok(Self::new(key, serde_json::to_vec(value)?))
    }

    /// Decode the value as JSON.
    pub fn decode_json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.value)
    }

    /// The value as text.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.value).map_err(|_| Error::InvalidUtf8(self.key.clone()))
    }
}
