//! Integration test: wallet sign-in across the crypto, auth, and core crates.

use celorean_auth::{AuthError, SessionError, SignInMessage, TokenError};
use celorean_crypto::WalletKey;
use celorean_integration_tests::{authenticator, challenge, signed_login, CHAIN_ID, HOST, ORIGIN};

#[tokio::test]
async fn test_login_then_session_check() {
    let auth = authenticator(7);
    let key = WalletKey::generate();
    let req = signed_login(&auth, &key, &challenge("n1", 1_000, 601_000));

    let outcome = auth.login_at(&req, 2_000).await.expect("login");
    assert_eq!(outcome.session.subject_address, key.address());
    assert_eq!(outcome.session.chain_id, CHAIN_ID);

    let status = auth.session_status_at(Some(&outcome.cookie_value), 3_000);
    assert!(status.authenticated);
    assert_eq!(status.session, Some(outcome.session.clone()));

    let expired = auth.session_status_at(Some(&outcome.cookie_value), outcome.session.expires_at_ms);
    assert!(!expired.authenticated);
}

#[tokio::test]
async fn test_expired_challenge_fails_despite_valid_signature() {
    let auth = authenticator(7);
    let key = WalletKey::generate();
    let req = signed_login(&auth, &key, &challenge("n1", 1_000, 2_000));

    let err = auth.login_at(&req, 3_000).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(TokenError::Expired)));

    // the same request is fine inside the window
    assert!(auth.login_at(&req, 2_000).await.is_ok());
}

#[tokio::test]
async fn test_signature_does_not_transfer_between_addresses() {
    let auth = authenticator(7);
    let alice = WalletKey::generate();
    let bob = WalletKey::generate();
    let mut req = signed_login(&auth, &alice, &challenge("n1", 1_000, 601_000));
    req.address = bob.address().to_string();

    let err = auth.login_at(&req, 2_000).await.unwrap_err();
    assert!(matches!(err, AuthError::SignatureMismatch));
}

#[tokio::test]
async fn test_signature_bound_to_every_message_field() {
    let auth = authenticator(7);
    let key = WalletKey::generate();
    let signed = challenge("n1", 1_000, 601_000);
    let address = key.address().to_string();
    let message = SignInMessage::from_challenge(&signed, &address, CHAIN_ID)
        .unwrap()
        .to_string();
    let signature = key.sign_personal(message.as_bytes()).unwrap().to_hex();

    let mut host = signed.clone();
    host.host = "evil.example".into();
    let mut nonce = signed.clone();
    nonce.nonce = "n2".into();
    let mut issued = signed.clone();
    issued.issued_at_ms += 1;
    let mut origin = signed.clone();
    origin.origin = format!("{}/phish", ORIGIN);

    for altered in [host, nonce, issued, origin] {
        let mut req = signed_login(&auth, &key, &altered);
        req.signature = signature.clone();
        let err = auth.login_at(&req, 2_000).await.unwrap_err();
        assert!(matches!(err, AuthError::SignatureMismatch), "{:?}", altered);
    }

    let mut req = signed_login(&auth, &key, &signed);
    req.chain_id = CHAIN_ID + 1;
    assert!(matches!(
        auth.login_at(&req, 2_000).await,
        Err(AuthError::SignatureMismatch)
    ));
}

#[tokio::test]
async fn test_cookie_from_other_deployment_rejected() {
    let ours = authenticator(7);
    let theirs = authenticator(8);
    let key = WalletKey::generate();
    let req = signed_login(&theirs, &key, &challenge("n1", 1_000, 601_000));

    let outcome = theirs.login_at(&req, 2_000).await.expect("login elsewhere");
    assert_eq!(
        ours.sessions().verify_at(&outcome.cookie_value, 3_000),
        Err(SessionError::BadSignature)
    );
    assert!(matches!(
        ours.login_at(&req, 2_000).await,
        Err(AuthError::InvalidToken(TokenError::BadSignature))
    ));
}

#[test]
fn test_issued_challenge_decodes() {
    let auth = authenticator(7);
    let issued = auth
        .challenges()
        .issue_at(ORIGIN, HOST, 600_000, 10_000)
        .unwrap();
    let payload = auth.challenges().decode_at(&issued.token, 10_000).unwrap();
    assert_eq!(payload.nonce, issued.nonce);
    assert_eq!(payload.expires_at_ms, 610_000);
    assert_eq!(payload.host, HOST);
}
