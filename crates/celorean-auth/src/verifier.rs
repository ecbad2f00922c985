//! Wallet signature checks for the sign-in message.

use async_trait::async_trait;
use serde::Deserialize;

use celorean_core::Address;
use celorean_crypto::{personal_message_hash, recover_personal_signer, RecoverableSignature};

use crate::error::AuthError;

/// Return value of ERC-1271 `isValidSignature` for an accepted signature.
pub const ERC1271_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

/// Decides whether `signature` over `message` was produced by `address`.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify(
        &self,
        address: &Address,
        message: &str,
        signature: &str,
    ) -> Result<bool, AuthError>;
}

/// Local secp256k1 recovery for externally owned accounts.
#[derive(Debug, Clone, Default)]
pub struct EoaSignatureVerifier;

impl EoaSignatureVerifier {
    fn check(address: &Address, message: &str, signature: &str) -> bool {
        let Ok(sig) = RecoverableSignature::from_hex(signature) else {
            return false;
        };
        match recover_personal_signer(message.as_bytes(), &sig) {
            Ok(signer) => &signer == address,
            Err(_) => false,
        }
    }
}

#[async_trait]
impl SignatureVerifier for EoaSignatureVerifier {
    async fn verify(
        &self,
        address: &Address,
        message: &str,
        signature: &str,
    ) -> Result<bool, AuthError> {
        Ok(Self::check(address, message, signature))
    }
}

/// Local recovery first, then an ERC-1271 `isValidSignature` call against
/// the address over JSON-RPC for contract wallets.
#[derive(Debug, Clone)]
pub struct RpcSignatureVerifier {
    client: reqwest::Client,
    rpc_url: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    message: String,
}

impl RpcSignatureVerifier {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), rpc_url)
    }

    pub fn with_client(client: reqwest::Client, rpc_url: impl Into<String>) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
        }
    }

    async fn is_valid_contract_signature(
        &self,
        address: &Address,
        message: &str,
        signature: &str,
    ) -> Result<bool, AuthError> {
        let raw = signature.strip_prefix("0x").unwrap_or(signature);
        let Ok(sig_bytes) = hex::decode(raw) else {
            return Ok(false);
        };
        let calldata = encode_is_valid_signature(&personal_message_hash(message.as_bytes()), &sig_bytes);

        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": address.as_str(), "data": format!("0x{}", hex::encode(calldata)) },
                "latest"
            ],
        });

        let resp: RpcResponse = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::UpstreamFailure(format!("rpc request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AuthError::UpstreamFailure(format!("rpc status: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::UpstreamFailure(format!("rpc response: {}", e)))?;

        if let Some(err) = resp.error {
            // Reverts and calls to accounts without code land here.
            tracing::debug!(%address, error = %err.message, "isValidSignature call rejected");
            return Ok(false);
        }
        Ok(resp
            .result
            .as_deref()
            .map(is_magic_value)
            .unwrap_or(false))
    }
}

#[async_trait]
impl SignatureVerifier for RpcSignatureVerifier {
    async fn verify(
        &self,
        address: &Address,
        message: &str,
        signature: &str,
    ) -> Result<bool, AuthError> {
        if EoaSignatureVerifier::check(address, message, signature) {
            return Ok(true);
        }
        self.is_valid_contract_signature(address, message, signature)
            .await
    }
}

/// ABI-encode `isValidSignature(bytes32,bytes)`.
fn encode_is_valid_signature(hash: &[u8; 32], signature: &[u8]) -> Vec<u8> {
    let padded_len = signature.len().div_ceil(32) * 32;
    let mut data = Vec::with_capacity(4 + 32 * 3 + padded_len);
    // The function selector doubles as the magic return value.
    data.extend_from_slice(&ERC1271_MAGIC_VALUE);
    data.extend_from_slice(hash);
    data.extend_from_slice(&abi_word(0x40));
    data.extend_from_slice(&abi_word(signature.len() as u64));
    data.extend_from_slice(signature);
    data.resize(4 + 32 * 3 + padded_len, 0);
    data
}

fn abi_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn is_magic_value(result: &str) -> bool {
    let raw = result.strip_prefix("0x").unwrap_or(result);
    match hex::decode(raw) {
        Ok(bytes) => bytes.len() >= 4 && bytes[..4] == ERC1271_MAGIC_VALUE,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celorean_crypto::WalletKey;

    #[tokio::test]
    async fn test_eoa_accepts_own_signature() {
        let key = WalletKey::generate();
        let sig = key.sign_personal(b"hello").unwrap().to_hex();
        let ok = EoaSignatureVerifier
            .verify(&key.address(), "hello", &sig)
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_eoa_rejects_other_address() {
        let key = WalletKey::generate();
        let other = WalletKey::generate();
        let sig = key.sign_personal(b"hello").unwrap().to_hex();
        let ok = EoaSignatureVerifier
            .verify(&other.address(), "hello", &sig)
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_eoa_rejects_unparseable_signature() {
        let key = WalletKey::generate();
        let ok = EoaSignatureVerifier
            .verify(&key.address(), "hello", "0xdeadbeef")
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_rpc_verifier_short_circuits_on_eoa() {
        // Unroutable URL: must not be contacted for a valid EOA signature.
        let verifier = RpcSignatureVerifier::new("http://127.0.0.1:9/");
        let key = WalletKey::generate();
        let sig = key.sign_personal(b"hello").unwrap().to_hex();
        assert!(verifier.verify(&key.address(), "hello", &sig).await.unwrap());
    }

    #[tokio::test]
    async fn test_rpc_verifier_unreachable_is_upstream_failure() {
        let verifier = RpcSignatureVerifier::new("http://127.0.0.1:9/");
        let key = WalletKey::generate();
        let other = WalletKey::generate();
        let sig = key.sign_personal(b"hello").unwrap().to_hex();
        let err = verifier
            .verify(&other.address(), "hello", &sig)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UpstreamFailure(_)));
    }

    #[test]
    fn test_encode_is_valid_signature_layout() {
        let hash = [0xAAu8; 32];
        let sig = [0xBBu8; 65];
        let data = encode_is_valid_signature(&hash, &sig);
        assert_eq!(&data[..4], &ERC1271_MAGIC_VALUE);
        assert_eq!(&data[4..36], &hash);
        assert_eq!(data[67], 0x40);
        assert_eq!(data[99], 65);
        assert_eq!(data.len(), 4 + 96 + 96);
        assert!(data[100 + 65..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_magic_value_detection() {
        assert!(is_magic_value(
            "0x1626ba7e00000000000000000000000000000000000000000000000000000000"
        ));
        assert!(!is_magic_value(
            "0xffffffff00000000000000000000000000000000000000000000000000000000"
        ));
        assert!(!is_magic_value("0x"));
    }
}
