use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;

use super::{ContentId, ContentStore, Tags};
use crate::error::StoreError;

/// Content store backed by a Pinata-compatible pinning service: uploads go
/// through the pinning API, reads through an IPFS HTTP gateway.
#[derive(Clone)]
pub struct PinningServiceStore {
    client: reqwest::Client,
    api_url: String,
    gateway_url: String,
    api_token: String,
}

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Deserialize)]
struct PinListResponse {
    rows: Vec<PinRow>,
}

#[derive(Deserialize)]
struct PinRow {
    ipfs_pin_hash: String,
}

impl PinningServiceStore {
    pub fn new(
        api_url: impl Into<String>,
        gateway_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            gateway_url: gateway_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        }
    }

    /// `metadata[keyvalues]` filter: every tag must match exactly.
    fn keyvalues_filter(tags: &Tags) -> String {
        let filter: serde_json::Map<String, serde_json::Value> = tags
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::json!({ "value": v, "op": "eq" })))
            .collect();
        serde_json::Value::Object(filter).to_string()
    }
}

impl fmt::Debug for PinningServiceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinningServiceStore")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

fn unavailable(e: reqwest::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl ContentStore for PinningServiceStore {
    async fn put(&self, bytes: Vec<u8>, tags: &Tags) -> Result<ContentId, StoreError> {
        let name = tags
            .get("credentialId")
            .map(|id| format!("credential-{}.json", id))
            .unwrap_or_else(|| "object.json".to_string());
        let metadata = serde_json::json!({ "name": name, "keyvalues": tags });

        let file = Part::bytes(bytes)
            .file_name(name)
            .mime_str("application/json")
            .map_err(|e| StoreError::BadResponse(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("pinataMetadata", metadata.to_string());

        let resp = self
            .client
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;

        let pinned: PinResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::BadResponse(e.to_string()))?;
        ContentId::parse(&pinned.ipfs_hash).map_err(StoreError::BadResponse)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, StoreError> {
        let resp = self
            .client
            .get(self.gateway_url(id))
            .send()
            .await
            .map_err(unavailable)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let resp = resp.error_for_status().map_err(unavailable)?;
        let bytes = resp.bytes().await.map_err(unavailable)?;
        Ok(bytes.to_vec())
    }

    async fn list_by_tag(&self, tags: &Tags) -> Result<Vec<ContentId>, StoreError> {
        let filter = Self::keyvalues_filter(tags);
        let resp = self
            .client
            .get(format!("{}/data/pinList", self.api_url))
            .bearer_auth(&self.api_token)
            .query(&[
                ("status", "pinned"),
                ("pageLimit", "1000"),
                ("metadata[keyvalues]", filter.as_str()),
            ])
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;

        let list: PinListResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::BadResponse(e.to_string()))?;

        let mut ids = Vec::with_capacity(list.rows.len());
        for row in list.rows {
            match ContentId::parse(&row.ipfs_pin_hash) {
                Ok(id) if !ids.contains(&id) => ids.push(id),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping pin with unparseable hash"),
            }
        }
        Ok(ids)
    }

    fn gateway_url(&self, id: &ContentId) -> String {
        format!("{}/ipfs/{}", self.gateway_url, id)
    }
}
