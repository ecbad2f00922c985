/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("signing secret too short: expected at least {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },

    #[error("validation error: {0}")]
    ValidationError(String),
}
