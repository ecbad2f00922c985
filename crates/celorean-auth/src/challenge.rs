//! Sign-in challenge tokens.
//!
//! Wire form: `base64url(payload_json) + "." + base64url(hmac(encoded_payload))`.
//! The MAC is computed over the encoded payload segment exactly as transmitted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use serde::Serialize;

use celorean_core::{now_ms, ChallengePayload, SigningSecret};
use celorean_crypto::{keyed_hash, verify_keyed_hash};

use crate::error::TokenError;

/// A freshly issued challenge with its encoded token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedChallenge {
    pub token: String,
    pub nonce: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Encodes and verifies challenge tokens under a fixed secret.
#[derive(Debug, Clone)]
pub struct ChallengeCodec {
    secret: SigningSecret,
}

impl ChallengeCodec {
    pub fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    /// Serialize, encode and sign a payload.
    pub fn encode(&self, payload: &ChallengePayload) -> Result<String, TokenError> {
        let json =
            serde_json::to_vec(payload).map_err(|e| TokenError::Malformed(e.to_string()))?;
        let encoded = URL_SAFE_NO_PAD.encode(json);
        let tag = keyed_hash(&self.secret, encoded.as_bytes())
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        Ok(format!("{}.{}", encoded, URL_SAFE_NO_PAD.encode(tag)))
    }

    /// Verify and decode a token against the current time.
    pub fn decode(&self, token: &str) -> Result<ChallengePayload, TokenError> {
        self.decode_at(token, now_ms())
    }

    /// Verify and decode a token as of `now_ms`.
    pub fn decode_at(&self, token: &str, now_ms: i64) -> Result<ChallengePayload, TokenError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [encoded, signature] = parts.as_slice() else {
            return Err(TokenError::Malformed(format!(
                "expected 2 segments, got {}",
                parts.len()
            )));
        };

        let tag = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::BadSignature)?;
        if !verify_keyed_hash(&self.secret, encoded.as_bytes(), &tag) {
            return Err(TokenError::BadSignature);
        }

        let json = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        let payload: ChallengePayload =
            serde_json::from_slice(&json).map_err(|e| TokenError::Malformed(e.to_string()))?;

        if payload.is_expired_at(now_ms) {
            return Err(TokenError::Expired);
        }
        Ok(payload)
    }

    /// Mint a challenge for `origin`/`host` with a random 32-byte hex nonce.
    pub fn issue(
        &self,
        origin: &str,
        host: &str,
        ttl_ms: i64,
    ) -> Result<IssuedChallenge, TokenError> {
        self.issue_at(origin, host, ttl_ms, now_ms())
    }

    pub fn issue_at(
        &self,
        origin: &str,
        host: &str,
        ttl_ms: i64,
        now_ms: i64,
    ) -> Result<IssuedChallenge, TokenError> {
        let mut nonce_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let payload = ChallengePayload {
            nonce: hex::encode(nonce_bytes),
            issued_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
            origin: origin.to_string(),
            host: host.to_string(),
        };
        let token = self.encode(&payload)?;
        tracing::debug!(host, "challenge issued");
        Ok(IssuedChallenge {
            token,
            nonce: payload.nonce,
            issued_at: payload.issued_at_ms,
            expires_at: payload.expires_at_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> ChallengeCodec {
        ChallengeCodec::new(SigningSecret::new(vec![0x11u8; 32]).unwrap())
    }

    fn payload() -> ChallengePayload {
        ChallengePayload {
            nonce: "n1".into(),
            issued_at_ms: 1000,
            expires_at_ms: 2000,
            origin: "https://app.celorean.xyz".into(),
            host: "app.celorean.xyz".into(),
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let c = codec();
        let token = c.encode(&payload()).unwrap();
        assert_eq!(c.decode_at(&token, 1500).unwrap(), payload());
    }

    #[test]
    fn test_token_shape() {
        let token = codec().encode(&payload()).unwrap();
        let (body, sig) = token.split_once('.').unwrap();
        assert!(!body.contains('='));
        // 32-byte MAC, unpadded base64url
        assert_eq!(sig.len(), 43);
    }

    #[test]
    fn test_decode_expired() {
        let c = codec();
        let token = c.encode(&payload()).unwrap();
        assert_eq!(c.decode_at(&token, 3000), Err(TokenError::Expired));
        assert!(c.decode_at(&token, 2000).is_ok());
    }

    #[test]
    fn test_decode_wrong_secret() {
        let token = codec().encode(&payload()).unwrap();
        let other = ChallengeCodec::new(SigningSecret::new(vec![0x22u8; 32]).unwrap());
        assert_eq!(other.decode_at(&token, 1500), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_decode_tampered_payload() {
        let c = codec();
        let token = c.encode(&payload()).unwrap();
        let (_, sig) = token.split_once('.').unwrap();
        let mut forged = payload();
        forged.expires_at_ms = i64::MAX;
        let forged_body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let forged_token = format!("{}.{}", forged_body, sig);
        assert_eq!(c.decode_at(&forged_token, 1500), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_decode_wrong_segment_count() {
        let c = codec();
        assert!(matches!(c.decode_at("abc", 0), Err(TokenError::Malformed(_))));
        assert!(matches!(c.decode_at("a.b.c", 0), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_decode_signed_garbage_is_malformed() {
        let c = codec();
        let body = URL_SAFE_NO_PAD.encode(b"{\"nonce\":\"n1\"}");
        let tag = keyed_hash(&c.secret, body.as_bytes()).unwrap();
        let token = format!("{}.{}", body, URL_SAFE_NO_PAD.encode(tag));
        assert!(matches!(c.decode_at(&token, 0), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_issue_produces_decodable_token() {
        let c = codec();
        let issued = c
            .issue_at("https://app.celorean.xyz", "app.celorean.xyz", 600_000, 10_000)
            .unwrap();
        assert_eq!(issued.nonce.len(), 64);
        assert_eq!(issued.expires_at, 610_000);
        let decoded = c.decode_at(&issued.token, 10_001).unwrap();
        assert_eq!(decoded.nonce, issued.nonce);
        assert_eq!(decoded.host, "app.celorean.xyz");
    }

    #[test]
    fn test_issue_with_huge_ttl_saturates() {
        let c = codec();
        let issued = c.issue_at("https://a", "a", i64::MAX, 10_000).unwrap();
        assert_eq!(issued.expires_at, i64::MAX);
        assert!(c.decode_at(&issued.token, 20_000).is_ok());
    }

    #[test]
    fn test_issued_nonces_are_unique() {
        let c = codec();
        let a = c.issue("https://a", "a", 1000).unwrap();
        let b = c.issue("https://a", "a", 1000).unwrap();
        assert_ne!(a.nonce, b.nonce);
    }
}
