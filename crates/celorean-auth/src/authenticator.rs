//! Login orchestration: challenge → message → wallet signature → session.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use celorean_core::{now_ms, Address, AuthConfig, Session, WalletType};

use crate::challenge::ChallengeCodec;
use crate::error::AuthError;
use crate::message::SignInMessage;
use crate::session::SessionCodec;
use crate::verifier::SignatureVerifier;

/// Body of a login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub address: String,
    pub signature: String,
    pub token: String,
    pub chain_id: u64,
    #[serde(default)]
    pub wallet_type: Option<String>,
}

/// A successful login: the session and its signed cookie value.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: Session,
    pub cookie_value: String,
}

/// Result of checking a presented session cookie. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionStatus {
    fn unauthenticated(reason: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            session: None,
            error: Some(reason.into()),
        }
    }
}

/// Verifies wallet logins and the sessions they produce.
pub struct Authenticator {
    config: AuthConfig,
    challenges: ChallengeCodec,
    sessions: SessionCodec,
    verifier: Arc<dyn SignatureVerifier>,
}

impl Authenticator {
    pub fn new(config: AuthConfig, verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self {
            challenges: ChallengeCodec::new(config.secret.clone()),
            sessions: SessionCodec::new(config.secret.clone()),
            config,
            verifier,
        }
    }

    pub fn challenges(&self) -> &ChallengeCodec {
        &self.challenges
    }

    pub fn sessions(&self) -> &SessionCodec {
        &self.sessions
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Run a login attempt against the current time.
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginOutcome, AuthError> {
        self.login_at(req, now_ms()).await
    }

    /// Run a login attempt as of `now_ms`.
    pub async fn login_at(&self, req: &LoginRequest, now_ms: i64) -> Result<LoginOutcome, AuthError> {
        // The message embeds the same trimmed string that was validated.
        let raw_address = req.address.trim();
        let address = Address::parse(raw_address)
            .map_err(|e| AuthError::InvalidAddress(e.to_string()))?;
        validate_signature_shape(&req.signature)?;

        let challenge = self.challenges.decode_at(&req.token, now_ms)?;

        let message = SignInMessage::from_challenge(&challenge, raw_address, req.chain_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .to_string();

        if !self
            .verifier
            .verify(&address, &message, &req.signature)
            .await?
        {
            return Err(AuthError::SignatureMismatch);
        }

        let wallet_type = WalletType::from_lenient(req.wallet_type.as_deref());
        let (session, cookie_value) = self
            .sessions
            .mint_at(
                address,
                req.chain_id,
                wallet_type,
                self.config.session_ttl_ms,
                now_ms,
            )
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(
            subject = %session.subject_address,
            chain_id = session.chain_id,
            wallet_type = %session.wallet_type,
            "session minted"
        );
        Ok(LoginOutcome {
            session,
            cookie_value,
        })
    }

    /// Check a presented cookie value against the current time.
    pub fn session_status(&self, cookie_value: Option<&str>) -> SessionStatus {
        self.session_status_at(cookie_value, now_ms())
    }

    pub fn session_status_at(&self, cookie_value: Option<&str>, now_ms: i64) -> SessionStatus {
        let Some(value) = cookie_value.filter(|v| !v.is_empty()) else {
            return SessionStatus::unauthenticated("no session");
        };
        match self.sessions.verify_at(value, now_ms) {
            Ok(session) => SessionStatus {
                authenticated: true,
                session: Some(session),
                error: None,
            },
            Err(e) => {
                tracing::debug!(error = %e, "session rejected");
                SessionStatus::unauthenticated(e.to_string())
            }
        }
    }
}

/// `0x` followed by a non-empty, even-length run of hex digits.
fn validate_signature_shape(signature: &str) -> Result<(), AuthError> {
    let Some(hex_part) = signature.strip_prefix("0x") else {
        return Err(AuthError::InvalidSignature("missing 0x prefix".into()));
    };
    if hex_part.is_empty() || hex_part.len() % 2 != 0 {
        return Err(AuthError::InvalidSignature(
            "signature must be a non-empty even-length hex string".into(),
        ));
    }
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AuthError::InvalidSignature("non-hex characters".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenError;
    use crate::verifier::EoaSignatureVerifier;
    use celorean_core::{ChallengePayload, SigningSecret};
    use celorean_crypto::WalletKey;

    const ORIGIN: &str = "https://app.celorean.xyz";
    const HOST: &str = "app.celorean.xyz";

    fn authenticator() -> Authenticator {
        let config = AuthConfig::new(SigningSecret::new(vec![0x5Au8; 32]).unwrap());
        Authenticator::new(config, Arc::new(EoaSignatureVerifier))
    }

    fn signed_request(auth: &Authenticator, key: &WalletKey, payload: &ChallengePayload) -> LoginRequest {
        let token = auth.challenges().encode(payload).unwrap();
        let address = key.address().to_string();
        let message = SignInMessage::from_challenge(payload, &address, 44787)
            .unwrap()
            .to_string();
        LoginRequest {
            address,
            signature: key.sign_personal(message.as_bytes()).unwrap().to_hex(),
            token,
            chain_id: 44787,
            wallet_type: None,
        }
    }

    fn payload() -> ChallengePayload {
        ChallengePayload {
            nonce: "n1".into(),
            issued_at_ms: 1000,
            expires_at_ms: 2000,
            origin: ORIGIN.into(),
            host: HOST.into(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let auth = authenticator();
        let key = WalletKey::generate();
        let req = signed_request(&auth, &key, &payload());
        let outcome = auth.login_at(&req, 1500).await.unwrap();
        assert_eq!(outcome.session.subject_address, key.address());
        assert_eq!(outcome.session.expires_at_ms, 1500 + 86_400_000);
        assert_eq!(outcome.session.wallet_type, WalletType::Standard);
        let verified = auth.sessions().verify_at(&outcome.cookie_value, 1600).unwrap();
        assert_eq!(verified, outcome.session);
    }

    #[tokio::test]
    async fn test_login_accepts_padded_address() {
        let auth = authenticator();
        let key = WalletKey::generate();
        let mut req = signed_request(&auth, &key, &payload());
        req.address = format!("  {}\n", req.address);
        let outcome = auth.login_at(&req, 1500).await.unwrap();
        assert_eq!(outcome.session.subject_address, key.address());
    }

    #[tokio::test]
    async fn test_login_expired_token() {
        let auth = authenticator();
        let key = WalletKey::generate();
        let req = signed_request(&auth, &key, &payload());
        let err = auth.login_at(&req, 3000).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(TokenError::Expired)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_login_bad_address() {
        let auth = authenticator();
        let key = WalletKey::generate();
        let mut req = signed_request(&auth, &key, &payload());
        req.address = "0x123".into();
        let err = auth.login_at(&req, 1500).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_login_bad_signature_shape() {
        let auth = authenticator();
        let key = WalletKey::generate();
        for bad in ["", "deadbeef", "0x", "0xabc", "0xzz"] {
            let mut req = signed_request(&auth, &key, &payload());
            req.signature = bad.into();
            let err = auth.login_at(&req, 1500).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidSignature(_)), "{:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_login_signature_for_other_address() {
        let auth = authenticator();
        let key = WalletKey::generate();
        let other = WalletKey::generate();
        let mut req = signed_request(&auth, &key, &payload());
        req.address = other.address().to_string();
        let err = auth.login_at(&req, 1500).await.unwrap_err();
        assert!(matches!(err, AuthError::SignatureMismatch));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_login_chain_id_must_match_signed_message() {
        let auth = authenticator();
        let key = WalletKey::generate();
        let mut req = signed_request(&auth, &key, &payload());
        req.chain_id = 42220;
        let err = auth.login_at(&req, 1500).await.unwrap_err();
        assert!(matches!(err, AuthError::SignatureMismatch));
    }

    #[tokio::test]
    async fn test_login_token_from_other_secret() {
        let auth = authenticator();
        let key = WalletKey::generate();
        let foreign = Authenticator::new(
            AuthConfig::new(SigningSecret::new(vec![0x01u8; 32]).unwrap()),
            Arc::new(EoaSignatureVerifier),
        );
        let req = signed_request(&foreign, &key, &payload());
        let err = auth.login_at(&req, 1500).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(TokenError::BadSignature)));
    }

    #[tokio::test]
    async fn test_unknown_wallet_type_defaults_to_standard() {
        let auth = authenticator();
        let key = WalletKey::generate();
        let mut req = signed_request(&auth, &key, &payload());
        req.wallet_type = Some("hardware".into());
        let outcome = auth.login_at(&req, 1500).await.unwrap();
        assert_eq!(outcome.session.wallet_type, WalletType::Standard);

        req.wallet_type = Some("alternate".into());
        let outcome = auth.login_at(&req, 1500).await.unwrap();
        assert_eq!(outcome.session.wallet_type, WalletType::Alternate);
    }

    #[test]
    fn test_session_status_never_fails() {
        let auth = authenticator();
        let none = auth.session_status_at(None, 0);
        assert!(!none.authenticated);
        assert_eq!(none.error.as_deref(), Some("no session"));

        let garbage = auth.session_status_at(Some("garbage"), 0);
        assert!(!garbage.authenticated);
        assert!(garbage.error.is_some());
        assert!(garbage.session.is_none());
    }

    #[test]
    fn test_session_status_valid_and_expired() {
        let auth = authenticator();
        let (session, value) = auth
            .sessions()
            .mint_at(WalletKey::generate().address(), 1, WalletType::Standard, 1000, 0)
            .unwrap();
        let ok = auth.session_status_at(Some(&value), 10);
        assert!(ok.authenticated);
        assert_eq!(ok.session, Some(session));

        let expired = auth.session_status_at(Some(&value), 1000);
        assert!(!expired.authenticated);
        assert_eq!(expired.error.as_deref(), Some("session expired"));
    }

    #[test]
    fn test_session_status_json_shape() {
        let auth = authenticator();
        let status = auth.session_status_at(None, 0);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, serde_json::json!({"authenticated": false, "error": "no session"}));
    }
}
