use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use celorean_core::{Address, Environment};

/// Fixed `type` tag of every credential document.
pub const CREDENTIAL_TYPE: &str = "celorean.credential";

/// Fixed `proof.method` tag: integrity comes from the content id.
pub const PROOF_METHOD: &str = "ipfs-cid";

/// Where the discovery tags for a document live in the store.
pub const PROOF_KEY: &str = "pin.metadata.keyvalues";

/// Current document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Tag value marking stored objects as credentials.
pub const CREDENTIAL_TAG: &str = "credential";

/// Issuing party of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerInfo {
    pub name: String,
    pub contract_address: Option<String>,
    pub environment: Environment,
}

/// How the document's integrity is established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub method: String,
    pub key: String,
}

impl Default for Proof {
    fn default() -> Self {
        Self {
            method: PROOF_METHOD.into(),
            key: PROOF_KEY.into(),
        }
    }
}

/// A course credential as stored. Field order is the serialized order, and
/// the serialized bytes determine the content id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub version: String,
    pub title: String,
    pub description: String,
    pub student_address: Address,
    pub course_id: Option<u64>,
    pub issuer: IssuerInfo,
    pub issued_at: String,
    pub proof: Proof,
}

impl CredentialDocument {
    /// Canonical serialized bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Discovery tags attached to the stored object.
    pub fn tags(&self) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("type".to_string(), CREDENTIAL_TAG.to_string());
        tags.insert("subject".to_string(), self.student_address.to_string());
        tags.insert(
            "courseId".to_string(),
            self.course_id.map(|c| c.to_string()).unwrap_or_default(),
        );
        tags.insert("credentialId".to_string(), self.id.clone());
        tags.insert("environment".to_string(), self.issuer.environment.to_string());
        tags
    }
}
