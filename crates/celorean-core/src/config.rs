use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::error::CoreError;

/// Minimum accepted length of the signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default session lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Default challenge lifetime: 10 minutes.
pub const DEFAULT_CHALLENGE_TTL_MS: i64 = 10 * 60 * 1000;

/// Process-wide HMAC key for challenge tokens and session cookies.
///
/// Cloning shares the same allocation. The bytes are wiped when the last
/// clone drops and never appear in `Debug` output.
#[derive(Clone)]
pub struct SigningSecret(Arc<Zeroizing<Vec<u8>>>);

impl SigningSecret {
    /// Wrap raw secret bytes, rejecting keys shorter than [`MIN_SECRET_LEN`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CoreError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.len() < MIN_SECRET_LEN {
            return Err(CoreError::SecretTooShort {
                min: MIN_SECRET_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self(Arc::new(bytes)))
    }

    pub fn expose(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

/// Immutable authentication settings, built once at startup and handed to
/// each codec at construction.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: SigningSecret,
    pub session_ttl_ms: i64,
    pub challenge_ttl_ms: i64,
}

impl AuthConfig {
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            session_ttl_ms: DEFAULT_SESSION_TTL_MS,
            challenge_ttl_ms: DEFAULT_CHALLENGE_TTL_MS,
        }
    }

    pub fn with_session_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.session_ttl_ms = ttl_ms;
        self
    }

    pub fn with_challenge_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.challenge_ttl_ms = ttl_ms;
        self
    }
}
