/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("signer recovery failed")]
    RecoveryFailed,

    #[error("signing failed: {0}")]
    SigningError(String),
}
