use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use celorean_core::Address;

use crate::document::{CREDENTIAL_TAG, CREDENTIAL_TYPE, PROOF_METHOD};
use crate::error::CredentialError;
use crate::store::{ContentId, ContentStore, Tags};

/// Concurrent fetches while listing.
const LIST_CONCURRENCY: usize = 8;

/// An individual verification check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationCheck {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerificationCheck {
    fn new(name: &str, passed: bool, failure: &str) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: (!passed).then(|| failure.to_string()),
        }
    }
}

/// Result of verifying a stored credential. The parsed document is always
/// attached, valid or not.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub content_id: ContentId,
    pub valid: bool,
    pub document: Value,
    pub checks: Vec<VerificationCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub gateway_url: String,
}

/// One entry of a student's credential listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSummary {
    pub content_id: ContentId,
    pub id: Option<String>,
    pub title: Option<String>,
    pub issuer: Value,
    pub issued_at: Option<String>,
    pub url: String,
}

/// Fetches credentials from the content store and checks their structure.
pub struct CredentialVerifier {
    store: Arc<dyn ContentStore>,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Verify the credential stored under `raw_id`.
    ///
    /// A malformed id is rejected before any store access. A fetch failure
    /// is `NotFound`; a document that fails its checks is `valid: false`.
    pub async fn verify(&self, raw_id: &str) -> Result<VerificationOutcome, CredentialError> {
        let content_id = ContentId::parse(raw_id).map_err(CredentialError::InvalidContentId)?;

        let bytes = self.store.get(&content_id).await.map_err(|e| {
            tracing::debug!(cid = %content_id, error = %e, "credential fetch failed");
            CredentialError::NotFound(content_id.to_string())
        })?;
        let gateway_url = self.store.gateway_url(&content_id);

        let document: Value = match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(e) => {
                return Ok(VerificationOutcome {
                    content_id,
                    valid: false,
                    document: Value::Null,
                    checks: Vec::new(),
                    reason: Some(format!("not a JSON document: {}", e)),
                    gateway_url,
                })
            }
        };

        let checks = check_document(&document);
        let valid = checks.iter().all(|c| c.passed);
        let reason = checks
            .iter()
            .find(|c| !c.passed)
            .and_then(|c| c.detail.clone());

        tracing::info!(cid = %content_id, valid, "credential verified");

        Ok(VerificationOutcome {
            content_id,
            valid,
            document,
            checks,
            reason,
            gateway_url,
        })
    }

    /// All credentials tagged for `student`, newest first. Items that cannot
    /// be fetched or parsed are skipped.
    pub async fn list(&self, student: &str) -> Result<Vec<CredentialSummary>, CredentialError> {
        let student = Address::parse(student.trim())
            .map_err(|e| CredentialError::InvalidStudent(e.to_string()))?;

        let mut tags = Tags::new();
        tags.insert("type".into(), CREDENTIAL_TAG.into());
        tags.insert("subject".into(), student.to_string());
        let ids = self.store.list_by_tag(&tags).await?;

        let mut items: Vec<CredentialSummary> = stream::iter(ids)
            .map(|id| async move { self.summarize(id).await })
            .buffer_unordered(LIST_CONCURRENCY)
            .filter_map(|item| async move { item })
            .collect()
            .await;

        items.sort_by(|a, b| {
            b.issued_at
                .cmp(&a.issued_at)
                .then_with(|| a.content_id.cmp(&b.content_id))
        });
        tracing::debug!(subject = %student, count = items.len(), "credentials listed");
        Ok(items)
    }

    async fn summarize(&self, id: ContentId) -> Option<CredentialSummary> {
        let bytes = match self.store.get(&id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(cid = %id, error = %e, "skipping unfetchable credential");
                return None;
            }
        };
        let doc: Value = match serde_json::from_slice(&bytes) {
            Ok(Value::Object(map)) => Value::Object(map),
            _ => {
                tracing::warn!(cid = %id, "skipping malformed credential");
                return None;
            }
        };
        let text = |key: &str| doc.get(key).and_then(Value::as_str).map(str::to_string);

        Some(CredentialSummary {
            id: text("id"),
            title: text("title"),
            issuer: doc.get("issuer").cloned().unwrap_or(Value::Null),
            issued_at: text("issuedAt"),
            url: self.store.gateway_url(&id),
            content_id: id,
        })
    }
}

fn check_document(doc: &Value) -> Vec<VerificationCheck> {
    let present = |v: Option<&Value>| v.map_or(false, |v| !v.is_null());

    vec![
        VerificationCheck::new(
            "id",
            doc.get("id").map_or(false, Value::is_string),
            "id is missing or not a string",
        ),
        VerificationCheck::new(
            "type",
            doc.get("type").and_then(Value::as_str) == Some(CREDENTIAL_TYPE),
            "unexpected credential type",
        ),
        VerificationCheck::new(
            "proof_method",
            doc.pointer("/proof/method").and_then(Value::as_str) == Some(PROOF_METHOD),
            "unexpected proof method",
        ),
        VerificationCheck::new(
            "student_address",
            present(doc.get("studentAddress")),
            "studentAddress is missing",
        ),
        VerificationCheck::new(
            "issuer_contract",
            present(doc.pointer("/issuer/contractAddress")),
            "issuer.contractAddress is missing",
        ),
    ]
}
