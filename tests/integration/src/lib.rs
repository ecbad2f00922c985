//! Fixtures shared by the cross-crate scenarios in `tests/`.

use std::sync::Arc;

use celorean_auth::{Authenticator, EoaSignatureVerifier, LoginRequest, SignInMessage};
use celorean_core::{AuthConfig, ChallengePayload, Environment, SigningSecret};
use celorean_credentials::{CredentialIssuer, CredentialVerifier, IssuerDefaults, MemoryStore};
use celorean_crypto::WalletKey;

pub const ORIGIN: &str = "https://app.celorean.xyz";
pub const HOST: &str = "app.celorean.xyz";
pub const CHAIN_ID: u64 = 44787;
pub const TESTNET_CONTRACT: &str = "0x1111111111111111111111111111111111111111";

pub fn secret(fill: u8) -> SigningSecret {
    SigningSecret::new(vec![fill; 32]).expect("32-byte secret")
}

/// Authenticator over local signature recovery only.
pub fn authenticator(fill: u8) -> Authenticator {
    Authenticator::new(AuthConfig::new(secret(fill)), Arc::new(EoaSignatureVerifier))
}

pub fn challenge(nonce: &str, issued_at_ms: i64, expires_at_ms: i64) -> ChallengePayload {
    ChallengePayload {
        nonce: nonce.into(),
        issued_at_ms,
        expires_at_ms,
        origin: ORIGIN.into(),
        host: HOST.into(),
    }
}

/// A login request for `payload`, signed by `key` the way a wallet would.
pub fn signed_login(auth: &Authenticator, key: &WalletKey, payload: &ChallengePayload) -> LoginRequest {
    let token = auth.challenges().encode(payload).expect("encode challenge");
    let address = key.address().to_string();
    let message = SignInMessage::from_challenge(payload, &address, CHAIN_ID)
        .expect("render message")
        .to_string();
    LoginRequest {
        address,
        signature: key
            .sign_personal(message.as_bytes())
            .expect("sign message")
            .to_hex(),
        token,
        chain_id: CHAIN_ID,
        wallet_type: None,
    }
}

/// Issuer and verifier sharing one in-memory store, with a testnet contract.
pub fn credential_stack() -> (Arc<MemoryStore>, CredentialIssuer, CredentialVerifier) {
    let store = Arc::new(MemoryStore::new());
    let mut defaults = IssuerDefaults::default();
    defaults
        .contracts
        .insert(Environment::Testnet, TESTNET_CONTRACT.into());
    let issuer = CredentialIssuer::new(store.clone(), defaults);
    let verifier = CredentialVerifier::new(store.clone());
    (store, issuer, verifier)
}
