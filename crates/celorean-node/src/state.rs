//! Shared state handed to every API handler.

use std::sync::Arc;

use celorean_auth::{Authenticator, EoaSignatureVerifier, RpcSignatureVerifier, SignatureVerifier};
use celorean_core::{Address, SigningSecret};
use celorean_credentials::{
    ContentStore, CredentialIssuer, CredentialVerifier, MemoryStore, PinningServiceStore,
};

use crate::config::{CeloreanConfig, StoreBackend};

/// Session cookie attributes.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_secs: i64,
}

pub struct AppState {
    pub authenticator: Authenticator,
    pub issuer: CredentialIssuer,
    pub verifier: CredentialVerifier,
    pub cookie: CookieSettings,
    /// Addresses allowed to issue credentials. Empty means anyone.
    pub admins: Vec<Address>,
    pub public_origin: String,
    pub public_host: String,
}

impl AppState {
    /// Wire every component from config. The secret is resolved by the caller.
    pub fn from_config(config: &CeloreanConfig, secret: SigningSecret) -> anyhow::Result<Self> {
        let store: Arc<dyn ContentStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Pinning => {
                let token = config.store.api_token.clone().ok_or_else(|| {
                    anyhow::anyhow!("[store].api_token is required for the pinning backend")
                })?;
                Arc::new(PinningServiceStore::new(
                    config.store.api_url.clone(),
                    config.store.gateway_url.clone(),
                    token,
                ))
            }
        };

        let signature_verifier: Arc<dyn SignatureVerifier> = match &config.signature.rpc_url {
            Some(url) => Arc::new(RpcSignatureVerifier::new(url.clone())),
            None => Arc::new(EoaSignatureVerifier),
        };

        Self::new(
            Authenticator::new(config.auth_config(secret)?, signature_verifier),
            store,
            config,
        )
    }

    /// Build state around an explicit authenticator and store.
    pub fn new(
        authenticator: Authenticator,
        store: Arc<dyn ContentStore>,
        config: &CeloreanConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            cookie: CookieSettings {
                secure: config.auth.secure_cookie,
                max_age_secs: authenticator.config().session_ttl_ms / 1000,
            },
            authenticator,
            issuer: CredentialIssuer::new(store.clone(), config.issuer_defaults()?),
            verifier: CredentialVerifier::new(store),
            admins: config.admin_addresses()?,
            public_origin: config.api.public_origin.trim_end_matches('/').to_string(),
            public_host: config.public_host(),
        })
    }

    /// Whether `subject` may issue credentials.
    pub fn may_issue(&self, subject: &Address) -> bool {
        self.admins.is_empty() || self.admins.contains(subject)
    }
}
