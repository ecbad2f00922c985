use k256::ecdsa::SigningKey;
use zeroize::Zeroizing;

use celorean_core::Address;

use crate::error::CryptoError;
use crate::signing::{address_from_verifying_key, personal_message_hash, RecoverableSignature};

/// A secp256k1 account key able to produce personal-message signatures.
pub struct WalletKey {
    signing_key: SigningKey,
}

impl WalletKey {
    /// Generate a random key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Load a key from 32 raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Load a key from a hex string, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let raw = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        let bytes = Zeroizing::new(
            hex::decode(raw).map_err(|e| CryptoError::InvalidKey(e.to_string()))?,
        );
        Self::from_bytes(&bytes)
    }

    pub fn address(&self) -> Address {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign `message` the way a wallet's personal-sign does.
    pub fn sign_personal(&self, message: &[u8]) -> Result<RecoverableSignature, CryptoError> {
        let digest = personal_message_hash(message);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| CryptoError::SigningError(e.to_string()))?;
        Ok(RecoverableSignature::new(signature, recovery_id))
    }
}
