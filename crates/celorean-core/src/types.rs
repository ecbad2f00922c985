use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a millisecond timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn iso8601_millis(ms: i64) -> Result<String, CoreError> {
    let dt = DateTime::<Utc>::from_timestamp_millis(ms).ok_or(CoreError::InvalidTimestamp(ms))?;
    Ok(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// An account address: `0x` followed by 40 hex digits, held in lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse a hex account string. Mixed case is accepted; the stored form is lowercase.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let hex_part = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| CoreError::InvalidAddress(format!("missing 0x prefix: {}", raw)))?;
        if hex_part.len() != 40 {
            return Err(CoreError::InvalidAddress(format!(
                "expected 40 hex digits, got {}",
                hex_part.len()
            )));
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidAddress(format!(
                "non-hex characters in {}",
                raw
            )));
        }
        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    /// Build from the raw 20 address bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Kind of wallet that produced the sign-in signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    #[default]
    Standard,
    Alternate,
}

impl WalletType {
    /// Map a client-supplied label onto the closed set.
    /// Unknown or missing labels become [`WalletType::Standard`].
    pub fn from_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("alternate") => Self::Alternate,
            _ => Self::Standard,
        }
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Alternate => write!(f, "alternate"),
        }
    }
}

/// Deployment environment a credential was issued from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Localhost,
    #[default]
    Testnet,
    Mainnet,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Localhost => write!(f, "localhost"),
            Self::Testnet => write!(f, "testnet"),
            Self::Mainnet => write!(f, "mainnet"),
        }
    }
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "localhost" => Ok(Self::Localhost),
            "testnet" => Ok(Self::Testnet),
            "mainnet" => Ok(Self::Mainnet),
            other => Err(CoreError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// Payload carried inside a sign-in challenge token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    pub nonce: String,
    pub issued_at_ms: i64,
    pub expires_at_ms: i64,
    pub origin: String,
    pub host: String,
}

impl ChallengePayload {
    /// Whether the challenge is past its expiry at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at_ms
    }
}

/// An authenticated principal. Field order is the wire order; the session
/// signature covers the exact serialized bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub subject_address: Address,
    pub chain_id: u64,
    pub wallet_type: WalletType,
    pub issued_at_ms: i64,
    pub expires_at_ms: i64,
}

impl Session {
    /// Whether the session is no longer valid at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}
