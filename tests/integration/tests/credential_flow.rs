//! Integration test: credential issue → list → verify over one store.

use celorean_core::Environment;
use celorean_credentials::{ContentStore, CredentialError, IssueRequest, Tags};
use celorean_integration_tests::{credential_stack, TESTNET_CONTRACT};

const STUDENT: &str = "0xabc0000000000000000000000000000000000001";

#[tokio::test]
async fn test_issue_list_verify_end_to_end() {
    let (_, issuer, verifier) = credential_stack();
    let req = IssueRequest {
        student_address: STUDENT.into(),
        title: Some("Intro to Solidity".into()),
        ..Default::default()
    };
    let issued = issuer
        .issue(&req, Environment::Testnet, None)
        .await
        .expect("issue");
    assert_eq!(
        issued.document.issuer.contract_address.as_deref(),
        Some(TESTNET_CONTRACT)
    );

    let items = verifier.list(STUDENT).await.expect("list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title.as_deref(), Some("Intro to Solidity"));
    assert_eq!(items[0].content_id, issued.content_id);

    let outcome = verifier
        .verify(issued.content_id.as_str())
        .await
        .expect("verify");
    assert!(outcome.valid);
    assert_eq!(outcome.document["id"], issued.document.id.as_str());
}

#[tokio::test]
async fn test_listing_is_case_insensitive_on_student() {
    let (_, issuer, verifier) = credential_stack();
    let req = IssueRequest {
        student_address: STUDENT.to_uppercase().replacen("0X", "0x", 1),
        ..Default::default()
    };
    issuer.issue(&req, Environment::Testnet, None).await.unwrap();
    assert_eq!(verifier.list(STUDENT).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_content_identity_follows_bytes() {
    let (store, issuer, _) = credential_stack();
    let req = IssueRequest {
        student_address: STUDENT.into(),
        ..Default::default()
    };
    let doc = issuer
        .build_document(&req, Environment::Testnet, None, 1_714_564_800_000)
        .unwrap();

    let a = issuer.publish(doc.clone()).await.unwrap();
    let b = issuer.publish(doc.clone()).await.unwrap();
    assert_eq!(a.content_id, b.content_id);

    let mut other = doc;
    other.id = "00000000-0000-4000-8000-000000000000".into();
    let c = issuer.publish(other).await.unwrap();
    assert_ne!(a.content_id, c.content_id);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_unsigned_contract_document_is_invalid_but_returned() {
    let (store, _, verifier) = credential_stack();
    let doc = serde_json::json!({
        "id": "c1",
        "type": "celorean.credential",
        "studentAddress": STUDENT,
        "issuer": {"name": "Somebody", "contractAddress": null, "environment": "testnet"},
        "proof": {"method": "ipfs-cid", "key": "pin.metadata.keyvalues"},
    });
    let id = store
        .put(serde_json::to_vec(&doc).unwrap(), &Tags::new())
        .await
        .unwrap();

    let outcome = verifier.verify(id.as_str()).await.unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.document, doc);
}

#[tokio::test]
async fn test_verify_distinguishes_missing_from_malformed() {
    let (_, _, verifier) = credential_stack();
    assert!(matches!(
        verifier.verify("Qm-not-a-real-id").await,
        Err(CredentialError::InvalidContentId(_))
    ));
    assert!(matches!(
        verifier
            .verify("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG")
            .await,
        Err(CredentialError::NotFound(_))
    ));
}
