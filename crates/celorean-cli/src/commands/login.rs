//! `celorean login`: Sign in with a wallet key.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::Args;
use serde::Deserialize;

use celorean_auth::{LoginRequest, SignInMessage, SESSION_COOKIE_NAME};
use celorean_core::ChallengePayload;
use celorean_crypto::WalletKey;

use super::DEFAULT_ENDPOINT;

/// Read when `--private-key` is not given.
const PRIVATE_KEY_ENV_VAR: &str = "CELOREAN_PRIVATE_KEY";

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Hex secp256k1 private key of the signing wallet.
    #[arg(short = 'k', long)]
    pub private_key: Option<String>,

    /// Chain id the wallet is connected to.
    #[arg(long, default_value_t = 44787)]
    pub chain_id: u64,

    /// Wallet type reported to the node (standard, alternate).
    #[arg(long)]
    pub wallet_type: Option<String>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct NonceResponse {
    token: String,
}

/// Rebuild the sign-in message carried by `token` and sign it with `key`.
///
/// The payload half of the token is readable without the node's secret;
/// only the node can check the MAC.
pub fn sign_challenge(
    key: &WalletKey,
    token: &str,
    chain_id: u64,
    wallet_type: Option<String>,
) -> anyhow::Result<LoginRequest> {
    let (encoded, _) = token
        .split_once('.')
        .ok_or_else(|| anyhow::anyhow!("node returned a malformed challenge token"))?;
    let json = URL_SAFE_NO_PAD.decode(encoded)?;
    let payload: ChallengePayload = serde_json::from_slice(&json)?;

    let address = key.address().to_string();
    let message = SignInMessage::from_challenge(&payload, &address, chain_id)?.to_string();
    tracing::debug!(%message, "signing sign-in message");
    let signature = key.sign_personal(message.as_bytes())?.to_hex();

    Ok(LoginRequest {
        address,
        signature,
        token: token.to_string(),
        chain_id,
        wallet_type,
    })
}

pub async fn run(args: &LoginArgs) -> anyhow::Result<()> {
    let raw_key = match &args.private_key {
        Some(k) => k.clone(),
        None => std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            anyhow::anyhow!("pass --private-key or set {}", PRIVATE_KEY_ENV_VAR)
        })?,
    };
    let key = WalletKey::from_hex(&raw_key)?;

    let client = reqwest::Client::new();
    let nonce_url = format!("{}/api/auth/nonce", args.endpoint);
    let resp = match client.get(&nonce_url).send().await {
        Ok(r) => r,
        Err(e) => {
            super::unreachable(&args.endpoint, e);
            return Ok(());
        }
    };
    if !resp.status().is_success() {
        return Err(super::failure("challenge request", resp).await);
    }
    let nonce: NonceResponse = resp.json().await?;

    let body = sign_challenge(&key, &nonce.token, args.chain_id, args.wallet_type.clone())?;
    let resp = client
        .post(format!("{}/api/auth/verify", args.endpoint))
        .json(&body)
        .send()
        .await?;
    if !resp.status().is_success() {
        return Err(super::failure("login", resp).await);
    }

    let cookie = resp
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .filter(|pair| pair.starts_with(SESSION_COOKIE_NAME))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("node did not set a session cookie"))?;

    println!("Signed in!");
    println!("  Address:  {}", body.address);
    println!("  Chain ID: {}", body.chain_id);
    println!("  Cookie:   {}", cookie);
    Ok(())
}
