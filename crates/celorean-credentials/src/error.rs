/// Content store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("content not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected store response: {0}")]
    BadResponse(String),
}

/// Credential system errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid student address: {0}")]
    InvalidStudent(String),

    #[error("invalid content id: {0}")]
    InvalidContentId(String),

    #[error("credential not found: {0}")]
    NotFound(String),

    #[error("issuance failed: {0}")]
    IssuanceFailed(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}
