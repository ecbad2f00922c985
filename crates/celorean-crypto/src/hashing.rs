use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use celorean_core::SigningSecret;

use crate::error::CryptoError;

/// 32-byte digest.
pub type Hash = [u8; 32];

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of arbitrary data.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Keccak-256 (the pre-standard SHA-3 variant used for account hashing).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// HMAC-SHA256 of `data` under the signing secret.
pub fn keyed_hash(secret: &SigningSecret, data: &[u8]) -> Result<Hash, CryptoError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.expose())
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Check a supplied tag against HMAC-SHA256 of `data` in constant time.
/// Tags of the wrong length are rejected.
pub fn verify_keyed_hash(secret: &SigningSecret, data: &[u8], tag: &[u8]) -> bool {
    let Ok(mut mac) = <HmacSha256 as Mac>::new_from_slice(secret.expose()) else {
        return false;
    };
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SigningSecret {
        SigningSecret::new(vec![0x42u8; 32]).unwrap()
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keyed_hash_deterministic() {
        let s = secret();
        assert_eq!(
            keyed_hash(&s, b"payload").unwrap(),
            keyed_hash(&s, b"payload").unwrap()
        );
    }

    #[test]
    fn test_keyed_hash_depends_on_key() {
        let other = SigningSecret::new(vec![0x43u8; 32]).unwrap();
        assert_ne!(
            keyed_hash(&secret(), b"payload").unwrap(),
            keyed_hash(&other, b"payload").unwrap()
        );
    }

    #[test]
    fn test_verify_keyed_hash_roundtrip() {
        let s = secret();
        let tag = keyed_hash(&s, b"payload").unwrap();
        assert!(verify_keyed_hash(&s, b"payload", &tag));
    }

    #[test]
    fn test_verify_keyed_hash_rejects_tampering() {
        let s = secret();
        let mut tag = keyed_hash(&s, b"payload").unwrap();
        assert!(!verify_keyed_hash(&s, b"payloae", &tag));
        tag[0] ^= 0x01;
        assert!(!verify_keyed_hash(&s, b"payload", &tag));
    }

    #[test]
    fn test_verify_keyed_hash_rejects_truncated_tag() {
        let s = secret();
        let tag = keyed_hash(&s, b"payload").unwrap();
        assert!(!verify_keyed_hash(&s, b"payload", &tag[..16]));
        assert!(!verify_keyed_hash(&s, b"payload", &[]));
    }
}
