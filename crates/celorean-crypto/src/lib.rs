pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use hashing::{keccak256, keyed_hash, sha256, verify_keyed_hash, Hash};
pub use keys::WalletKey;
pub use signing::{
    address_from_verifying_key, personal_message_hash, recover_personal_signer, RecoverableSignature,
};
