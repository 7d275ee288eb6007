use serde::Deserialize;
use std::fmt;

use crate::config::settings::SettingsConfig;
use crate::errors::TokenError;
use crate::utils::constants::{
    DEFAULT_API_TIMEOUT_MS, DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_TOKEN_TIMEOUT_MS,
    ENV_CLIENT_ID, ENV_CLIENT_SECRET, SENTINELHUB_BASE_URL, SENTINELHUB_OAUTH_URL,
};


/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub sentinelhub: SentinelHubConfig,
}

impl ServiceConfig {
    /// Defaults with credentials taken from the process environment.
    pub fn from_env() -> Self {
        Self {
            settings: SettingsConfig::default(),
            sentinelhub: SentinelHubConfig {
                credentials: Credentials::from_env(),
                ..SentinelHubConfig::default()
            },
        }
    }
}

/// ================================
/// Sentinel Hub upstream
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SentinelHubConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
    #[serde(default)]
    pub credentials: Credentials,
    /// subtracted from `expires_in` when computing token expiry
    #[serde(default = "default_safety_margin_seconds")]
    pub safety_margin_seconds: u64,
    #[serde(default = "default_token_timeout_ms")]
    pub token_timeout_ms: u64,
    #[serde(default = "default_api_timeout_ms")]
    pub api_timeout_ms: u64,
}

impl Default for SentinelHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            oauth_url: default_oauth_url(),
            credentials: Credentials::default(),
            safety_margin_seconds: default_safety_margin_seconds(),
            token_timeout_ms: default_token_timeout_ms(),
            api_timeout_ms: default_api_timeout_ms(),
        }
    }
}

/// Client-credentials pair. Empty strings count as absent.
#[derive(Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
        }
    }

    pub fn from_env() -> Self {
        Self {
            client_id: std::env::var(ENV_CLIENT_ID).ok(),
            client_secret: std::env::var(ENV_CLIENT_SECRET).ok(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.require().is_ok()
    }

    /// Returns `(client_id, client_secret)` or a configuration error naming what is missing.
    pub fn require(&self) -> Result<(&str, &str), TokenError> {
        let id = self.client_id.as_deref().filter(|v| !v.is_empty());
        let secret = self.client_secret.as_deref().filter(|v| !v.is_empty());
        match (id, secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(TokenError::Configuration(format!(
                "Sentinel Hub credentials not found. Please set {} and {} environment variables.",
                ENV_CLIENT_ID, ENV_CLIENT_SECRET
            ))),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

fn default_base_url() -> String {
    SENTINELHUB_BASE_URL.to_string()
}

fn default_oauth_url() -> String {
    SENTINELHUB_OAUTH_URL.to_string()
}

fn default_safety_margin_seconds() -> u64 {
    DEFAULT_SAFETY_MARGIN_SECS
}

fn default_token_timeout_ms() -> u64 {
    DEFAULT_TOKEN_TIMEOUT_MS
}

fn default_api_timeout_ms() -> u64 {
    DEFAULT_API_TIMEOUT_MS
}
