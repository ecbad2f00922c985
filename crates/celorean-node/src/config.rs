//! Node configuration loading and management.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use celorean_core::config::{DEFAULT_CHALLENGE_TTL_MS, DEFAULT_SESSION_TTL_MS};
use celorean_core::{Address, AuthConfig, Environment, SigningSecret};
use celorean_credentials::IssuerDefaults;

/// Environment variable that overrides `[auth].secret`.
pub const SECRET_ENV_VAR: &str = "CELOREAN_AUTH_SECRET";

/// Full configuration for the Celorean node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CeloreanConfig {
    /// HTTP API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Sign-in and session settings.
    #[serde(default)]
    pub auth: AuthSettings,

    /// Wallet signature checking.
    #[serde(default)]
    pub signature: SignatureConfig,

    /// Content store backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// Credential issuer identity.
    #[serde(default)]
    pub issuer: IssuerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Origin clients sign in to; the challenge host is derived from it.
    #[serde(default = "default_public_origin")]
    pub public_origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_challenge_ttl_secs")]
    pub challenge_ttl_secs: u64,
    /// Mark the session cookie `Secure`. Enable in production.
    #[serde(default)]
    pub secure_cookie: bool,
    /// Session signing secret. Prefer the environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SignatureConfig {
    /// JSON-RPC endpoint for contract-wallet (ERC-1271) checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Pinning,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "pinning" => Ok(Self::Pinning),
            other => anyhow::bail!("unknown store backend: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Pinning service API base URL.
    #[serde(default = "default_store_api_url")]
    pub api_url: String,
    /// IPFS gateway base URL.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Pinning service bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    #[serde(default = "default_issuer_name")]
    pub name: String,
    /// Issuing contract address keyed by environment name.
    #[serde(default)]
    pub contracts: HashMap<String, String>,
    /// Addresses allowed to issue. Empty leaves issuance open.
    #[serde(default)]
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    8080
}
fn default_public_origin() -> String {
    "http://localhost:3000".into()
}
fn default_session_ttl_secs() -> u64 {
    (DEFAULT_SESSION_TTL_MS / 1000) as u64
}
fn default_challenge_ttl_secs() -> u64 {
    (DEFAULT_CHALLENGE_TTL_MS / 1000) as u64
}
fn default_store_api_url() -> String {
    "https://api.pinata.cloud".into()
}
fn default_gateway_url() -> String {
    "https://gateway.pinata.cloud".into()
}
fn default_issuer_name() -> String {
    celorean_credentials::issuer::DEFAULT_ISSUER_NAME.into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
            public_origin: default_public_origin(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            challenge_ttl_secs: default_challenge_ttl_secs(),
            secure_cookie: false,
            secret: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            api_url: default_store_api_url(),
            gateway_url: default_gateway_url(),
            api_token: None,
        }
    }
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            name: default_issuer_name(),
            contracts: HashMap::new(),
            admins: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn secs_to_ms(secs: u64, field: &str) -> anyhow::Result<i64> {
    i64::try_from(secs)
        .ok()
        .and_then(|s| s.checked_mul(1000))
        .with_context(|| format!("[auth].{} is out of range: {}", field, secs))
}

impl CeloreanConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: CeloreanConfig = toml::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn api_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.api.listen_addr, self.api.port)
            .parse()
            .context("invalid API listen address")
    }

    /// Host part of the public origin, as shown in sign-in messages.
    pub fn public_host(&self) -> String {
        let origin = self.api.public_origin.trim_end_matches('/');
        let without_scheme = origin.split_once("://").map_or(origin, |(_, rest)| rest);
        without_scheme
            .split('/')
            .next()
            .unwrap_or(without_scheme)
            .to_string()
    }

    /// Signing secret from `env_secret` (the environment variable's value)
    /// or, failing that, the config file.
    pub fn signing_secret(&self, env_secret: Option<String>) -> anyhow::Result<SigningSecret> {
        let raw = env_secret
            .filter(|s| !s.is_empty())
            .or_else(|| self.auth.secret.clone())
            .with_context(|| format!("no signing secret: set {} or [auth].secret", SECRET_ENV_VAR))?;
        Ok(SigningSecret::new(raw.into_bytes())?)
    }

    /// Codec config with TTLs converted to milliseconds.
    pub fn auth_config(&self, secret: SigningSecret) -> anyhow::Result<AuthConfig> {
        Ok(AuthConfig::new(secret)
            .with_session_ttl_ms(secs_to_ms(self.auth.session_ttl_secs, "session_ttl_secs")?)
            .with_challenge_ttl_ms(secs_to_ms(self.auth.challenge_ttl_secs, "challenge_ttl_secs")?))
    }

    pub fn issuer_defaults(&self) -> anyhow::Result<IssuerDefaults> {
        let mut contracts = HashMap::new();
        for (env, address) in &self.issuer.contracts {
            let env: Environment = env.parse()?;
            contracts.insert(env, address.clone());
        }
        Ok(IssuerDefaults {
            name: self.issuer.name.clone(),
            contracts,
        })
    }

    pub fn admin_addresses(&self) -> anyhow::Result<Vec<Address>> {
        self.issuer
            .admins
            .iter()
            .map(|a| Address::parse(a).with_context(|| format!("invalid admin address {}", a)))
            .collect()
    }
}
