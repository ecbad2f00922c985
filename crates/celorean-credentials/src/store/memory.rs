use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use celorean_crypto::sha256;

use super::{ContentId, ContentStore, Tags};
use crate::error::StoreError;

/// Multihash prefix for a 32-byte SHA-256 digest.
const SHA256_MULTIHASH_PREFIX: [u8; 2] = [0x12, 0x20];

struct StoredObject {
    bytes: Arc<Vec<u8>>,
    tag_sets: Vec<Tags>,
}

/// In-process content store. Ids are CIDv0-shaped: base58 of the SHA-256
/// multihash of the stored bytes.
pub struct MemoryStore {
    objects: DashMap<ContentId, StoredObject>,
    gateway_base: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_gateway("https://ipfs.io/ipfs")
    }

    pub fn with_gateway(gateway_base: impl Into<String>) -> Self {
        Self {
            objects: DashMap::new(),
            gateway_base: gateway_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Content id the store assigns to `bytes`.
    pub fn content_id_for(bytes: &[u8]) -> ContentId {
        let mut multihash = Vec::with_capacity(34);
        multihash.extend_from_slice(&SHA256_MULTIHASH_PREFIX);
        multihash.extend_from_slice(&sha256(bytes));
        ContentId(bs58::encode(multihash).into_string())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn tags_match(stored: &Tags, query: &Tags) -> bool {
    query.iter().all(|(k, v)| stored.get(k) == Some(v))
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn put(&self, bytes: Vec<u8>, tags: &Tags) -> Result<ContentId, StoreError> {
        let id = Self::content_id_for(&bytes);
        let mut entry = self.objects.entry(id.clone()).or_insert_with(|| StoredObject {
            bytes: Arc::new(bytes),
            tag_sets: Vec::new(),
        });
        if !entry.tag_sets.contains(tags) {
            entry.tag_sets.push(tags.clone());
        }
        tracing::debug!(cid = %id, "object stored");
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, StoreError> {
        self.objects
            .get(id)
            .map(|obj| obj.bytes.as_ref().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_by_tag(&self, tags: &Tags) -> Result<Vec<ContentId>, StoreError> {
        let mut ids: Vec<ContentId> = self
            .objects
            .iter()
            .filter(|entry| entry.tag_sets.iter().any(|set| tags_match(set, tags)))
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn gateway_url(&self, id: &ContentId) -> String {
        format!("{}/{}", self.gateway_base, id)
    }
}
