use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use celorean_core::Address;

use crate::error::CryptoError;
use crate::hashing::{keccak256, Hash};

/// Prefix applied by wallets before hashing a personal message.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Keccak-256 of `prefix || len(message) || message`.
pub fn personal_message_hash(message: &[u8]) -> Hash {
    let len = message.len().to_string();
    let mut data = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + len.len() + message.len());
    data.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    data.extend_from_slice(len.as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

/// A 65-byte `r || s || v` secp256k1 signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    pub(crate) fn new(signature: Signature, recovery_id: RecoveryId) -> Self {
        Self {
            signature,
            recovery_id,
        }
    }

    /// Parse raw bytes. `v` may be 0/1 or 27/28. High-s signatures are
    /// normalized with the recovery parity flipped to match.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 65 {
            return Err(CryptoError::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }
        let v = match bytes[64] {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - 27,
            other => {
                return Err(CryptoError::InvalidSignature(format!(
                    "unsupported recovery byte {}",
                    other
                )))
            }
        };
        let signature = Signature::from_slice(&bytes[..64])
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(v)
            .ok_or_else(|| CryptoError::InvalidSignature("bad recovery id".into()))?;

        Ok(match signature.normalize_s() {
            Some(low_s) => Self::new(
                low_s,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => Self::new(signature, recovery_id),
        })
    }

    /// Parse a `0x`-prefixed hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Encode as `r || s || v` with `v` in 27/28 form.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&self.signature.to_bytes());
        out[64] = self.recovery_id.to_byte() + 27;
        out
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

/// Account address of a public key: last 20 bytes of Keccak-256 over the
/// uncompressed point without its 0x04 tag.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.as_affine().to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address::from_bytes(out)
}

/// Recover the account that produced `signature` over a personal message.
pub fn recover_personal_signer(
    message: &[u8],
    signature: &RecoverableSignature,
) -> Result<Address, CryptoError> {
    let digest = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &signature.signature, signature.recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(address_from_verifying_key(&key))
}
