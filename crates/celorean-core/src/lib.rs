//! Celorean Core: Shared types, errors, and configuration for wallet
//! sign-in sessions and course credentials.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AuthConfig, SigningSecret};
pub use error::CoreError;
pub use types::{iso8601_millis, now_ms, Address, ChallengePayload, Environment, Session, WalletType};
