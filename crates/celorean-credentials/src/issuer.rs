use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use celorean_core::{iso8601_millis, now_ms, Address, Environment};

use crate::document::{CredentialDocument, IssuerInfo, Proof, CREDENTIAL_TYPE, DOCUMENT_VERSION};
use crate::error::CredentialError;
use crate::store::{ContentId, ContentStore};

pub const DEFAULT_TITLE: &str = "Course Completion";
pub const DEFAULT_DESCRIPTION: &str = "Awarded for successfully completing the course.";
pub const DEFAULT_ISSUER_NAME: &str = "Celorean Academy";

/// Issuance request body. Only the student address is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub student_address: String,
    #[serde(default)]
    pub course_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub issuer_name: Option<String>,
}

/// Issuer-side defaults applied when a request leaves fields out.
#[derive(Debug, Clone)]
pub struct IssuerDefaults {
    pub name: String,
    /// Issuing contract per deployment environment.
    pub contracts: HashMap<Environment, String>,
}

impl Default for IssuerDefaults {
    fn default() -> Self {
        Self {
            name: DEFAULT_ISSUER_NAME.into(),
            contracts: HashMap::new(),
        }
    }
}

/// A stored credential and where to fetch it.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub content_id: ContentId,
    pub document: CredentialDocument,
    pub gateway_url: String,
    pub ipfs_url: String,
}

/// Builds credential documents and writes them to the content store.
pub struct CredentialIssuer {
    store: Arc<dyn ContentStore>,
    defaults: IssuerDefaults,
}

impl CredentialIssuer {
    pub fn new(store: Arc<dyn ContentStore>, defaults: IssuerDefaults) -> Self {
        Self { store, defaults }
    }

    pub fn defaults(&self) -> &IssuerDefaults {
        &self.defaults
    }

    /// Assemble a document with a fresh id. Nothing is stored.
    pub fn build_document(
        &self,
        req: &IssueRequest,
        environment: Environment,
        contract_override: Option<&str>,
        issued_at_ms: i64,
    ) -> Result<CredentialDocument, CredentialError> {
        let student_address = Address::parse(req.student_address.trim())
            .map_err(|e| CredentialError::InvalidStudent(e.to_string()))?;
        let issued_at = iso8601_millis(issued_at_ms)
            .map_err(|e| CredentialError::IssuanceFailed(e.to_string()))?;

        let contract_address = contract_override
            .map(str::to_string)
            .or_else(|| self.defaults.contracts.get(&environment).cloned());

        Ok(CredentialDocument {
            id: uuid::Uuid::new_v4().to_string(),
            credential_type: CREDENTIAL_TYPE.into(),
            version: DOCUMENT_VERSION.into(),
            title: non_empty(req.title.as_deref()).unwrap_or(DEFAULT_TITLE).to_string(),
            description: non_empty(req.description.as_deref())
                .unwrap_or(DEFAULT_DESCRIPTION)
                .to_string(),
            student_address,
            course_id: req.course_id,
            issuer: IssuerInfo {
                name: non_empty(req.issuer_name.as_deref())
                    .unwrap_or(&self.defaults.name)
                    .to_string(),
                contract_address,
                environment,
            },
            issued_at,
            proof: Proof::default(),
        })
    }

    /// Build and store a credential issued now.
    pub async fn issue(
        &self,
        req: &IssueRequest,
        environment: Environment,
        contract_override: Option<&str>,
    ) -> Result<IssuedCredential, CredentialError> {
        let document = self.build_document(req, environment, contract_override, now_ms())?;
        self.publish(document).await
    }

    /// Store an already-built document under its content id.
    pub async fn publish(
        &self,
        document: CredentialDocument,
    ) -> Result<IssuedCredential, CredentialError> {
        let bytes = document
            .to_bytes()
            .map_err(|e| CredentialError::Serialization(e.to_string()))?;
        let content_id = self.store.put(bytes, &document.tags()).await?;

        tracing::info!(
            subject = %document.student_address,
            cid = %content_id,
            credential_id = %document.id,
            environment = %document.issuer.environment,
            "credential issued"
        );

        Ok(IssuedCredential {
            gateway_url: self.store.gateway_url(&content_id),
            ipfs_url: content_id.ipfs_url(),
            content_id,
            document,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
