use std::fmt;

use celorean_core::{iso8601_millis, ChallengePayload};

/// The human-readable text a wallet signs to log in.
///
/// Server and client must render this byte-for-byte identically; any change
/// to the template invalidates every outstanding signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInMessage {
    pub host: String,
    pub address: String,
    pub origin: String,
    pub chain_id: u64,
    pub nonce: String,
    pub issued_at: String,
}

impl SignInMessage {
    /// Rebuild the message from a decoded challenge plus the caller's
    /// address (used verbatim) and chain id.
    pub fn from_challenge(
        challenge: &ChallengePayload,
        address: &str,
        chain_id: u64,
    ) -> Result<Self, celorean_core::CoreError> {
        Ok(Self {
            host: challenge.host.clone(),
            address: address.to_string(),
            origin: challenge.origin.clone(),
            chain_id,
            nonce: challenge.nonce.clone(),
            issued_at: iso8601_millis(challenge.issued_at_ms)?,
        })
    }
}

impl fmt::Display for SignInMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wants you to sign in with your Ethereum account:\n{}\n\nURI: {}\nVersion: 1\nChain ID: {}\nNonce: {}\nIssued At: {}",
            self.host, self.address, self.origin, self.chain_id, self.nonce, self.issued_at
        )
    }
}
