//! Content-addressed storage seam.
//!
//! Objects are immutable and identified by a hash of their bytes. Discovery
//! goes through string key/value tags attached at upload time.

mod memory;
mod pinning;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use pinning::PinningServiceStore;

/// Tag set attached to a stored object.
pub type Tags = BTreeMap<String, String>;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Identifier of a stored object: a CIDv0 (`Qm…`, base58) or a CIDv1 in
/// lowercase base32 (`b…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Shape check only; no network access.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let v0 = raw.len() == 46
            && raw.starts_with("Qm")
            && raw.chars().all(|c| BASE58_ALPHABET.contains(c));
        let v1 = raw.len() >= 59
            && raw.starts_with('b')
            && raw[1..]
                .chars()
                .all(|c| c.is_ascii_lowercase() || ('2'..='7').contains(&c));
        if v0 || v1 {
            Ok(Self(raw.to_string()))
        } else {
            Err(format!("not a content id: {:?}", raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `ipfs://` URI for the object.
    pub fn ipfs_url(&self) -> String {
        format!("ipfs://{}", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ContentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

/// An immutable, content-addressed object store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `bytes` with discovery `tags`, returning the content id.
    async fn put(&self, bytes: Vec<u8>, tags: &Tags) -> Result<ContentId, StoreError>;

    /// Fetch the exact bytes behind `id`.
    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, StoreError>;

    /// Ids of every object whose tags include all of `tags`.
    async fn list_by_tag(&self, tags: &Tags) -> Result<Vec<ContentId>, StoreError>;

    /// Human-fetchable HTTP URL for `id`.
    fn gateway_url(&self, id: &ContentId) -> String;
}
