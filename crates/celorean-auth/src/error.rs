/// Challenge token failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed challenge token: {0}")]
    Malformed(String),

    #[error("challenge token signature mismatch")]
    BadSignature,

    #[error("challenge token expired")]
    Expired,
}

/// Session cookie failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("malformed session: {0}")]
    Malformed(String),

    #[error("session signature mismatch")]
    BadSignature,

    #[error("session expired")]
    Expired,
}

/// Login failures, ordered by the step that raises them.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("signature does not match address")]
    SignatureMismatch,

    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether the failure is the caller's input rather than ours.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress(_) | Self::InvalidSignature(_) | Self::InvalidToken(_)
        )
    }
}
