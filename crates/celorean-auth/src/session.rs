//! Signed session cookies.
//!
//! Wire form: `hex(hmac(json)) + "." + base64(json)`. Note this is
//! signature-first, the reverse of the challenge token layout; both are kept
//! for compatibility with issued cookies and deployed clients.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use celorean_core::{now_ms, Address, Session, SigningSecret, WalletType};
use celorean_crypto::{keyed_hash, verify_keyed_hash};

use crate::error::SessionError;

/// Name of the cookie carrying the session.
pub const SESSION_COOKIE_NAME: &str = "celorean_session";

/// Mints and verifies session cookie values under a fixed secret.
#[derive(Debug, Clone)]
pub struct SessionCodec {
    secret: SigningSecret,
}

impl SessionCodec {
    pub fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    /// Build and sign a session starting now.
    pub fn mint(
        &self,
        subject: Address,
        chain_id: u64,
        wallet_type: WalletType,
        ttl_ms: i64,
    ) -> Result<(Session, String), SessionError> {
        self.mint_at(subject, chain_id, wallet_type, ttl_ms, now_ms())
    }

    pub fn mint_at(
        &self,
        subject: Address,
        chain_id: u64,
        wallet_type: WalletType,
        ttl_ms: i64,
        now_ms: i64,
    ) -> Result<(Session, String), SessionError> {
        let session = Session {
            subject_address: subject,
            chain_id,
            wallet_type,
            issued_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
        };
        let value = self.encode(&session)?;
        Ok((session, value))
    }

    /// Sign an existing session record.
    pub fn encode(&self, session: &Session) -> Result<String, SessionError> {
        let json =
            serde_json::to_vec(session).map_err(|e| SessionError::Malformed(e.to_string()))?;
        let tag = keyed_hash(&self.secret, &json)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        Ok(format!("{}.{}", hex::encode(tag), STANDARD.encode(&json)))
    }

    /// Verify a cookie value against the current time.
    pub fn verify(&self, value: &str) -> Result<Session, SessionError> {
        self.verify_at(value, now_ms())
    }

    /// Verify a cookie value as of `now_ms`.
    pub fn verify_at(&self, value: &str, now_ms: i64) -> Result<Session, SessionError> {
        let (signature, payload) = value
            .split_once('.')
            .ok_or_else(|| SessionError::Malformed("missing separator".into()))?;
        if signature.is_empty() || payload.is_empty() {
            return Err(SessionError::Malformed("empty segment".into()));
        }

        // Undecodable segments cannot carry a valid MAC for this payload.
        let tag = hex::decode(signature).map_err(|_| SessionError::BadSignature)?;
        let json = STANDARD
            .decode(payload)
            .map_err(|_| SessionError::BadSignature)?;
        if !verify_keyed_hash(&self.secret, &json, &tag) {
            return Err(SessionError::BadSignature);
        }

        let session: Session =
            serde_json::from_slice(&json).map_err(|e| SessionError::Malformed(e.to_string()))?;
        if session.is_expired_at(now_ms) {
            return Err(SessionError::Expired);
        }
        Ok(session)
    }
}
