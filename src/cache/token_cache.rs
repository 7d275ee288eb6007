use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::token::Token;
use crate::config::sources::{Credentials, SentinelHubConfig};
use crate::errors::TokenError;
use crate::helpers::time::Clock;
use crate::observability::metrics::{Metrics, ERROR_MSG, SUCCESS_MSG};
use crate::sources::oauth2::fetch_client_credentials;

/// Single-slot access token cache for one client-credentials pair.
///
/// The slot is guarded by an async mutex held across check, fetch and store,
/// so concurrent callers that miss together cause one token request, not many.
/// A failed fetch leaves the slot as it was.
pub struct CredentialTokenCache {
    credentials: Credentials,
    token_url: String,
    safety_margin_seconds: u64,
    client: Client,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
    slot: Mutex<Option<Token>>,
}

impl CredentialTokenCache {
    /// Credentials are only checked on the first `get_token` call.
    pub fn new(
        config: &SentinelHubConfig,
        clock: Arc<dyn Clock>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.token_timeout_ms))
            .build()?;

        Ok(Self {
            credentials: config.credentials.clone(),
            token_url: config.oauth_url.clone(),
            safety_margin_seconds: config.safety_margin_seconds,
            client,
            clock,
            metrics,
            slot: Mutex::new(None),
        })
    }

    pub fn credentials_configured(&self) -> bool {
        self.credentials.is_configured()
    }

    /// Returns the cached token while `now < expiry`, otherwise fetches and stores a new one.
    pub async fn get_token(&self) -> Result<Token, TokenError> {
        let mut slot = self.slot.lock().await;

        let now = self.clock.now_unix();
        if let Some(token) = slot.as_ref().filter(|token| token.is_valid_at(now)) {
            self.metrics.token_cache_hits.inc();
            return Ok(token.clone());
        }

        let (client_id, client_secret) = self.credentials.require()?;

        debug!("token slot empty or expired, fetching new token");
        let grant = fetch_client_credentials(&self.client, &self.token_url, client_id, client_secret)
            .await
            .inspect_err(|e| {
                warn!("token fetch failed: {}", e);
                self.metrics.token_fetches.with_label_values(&[ERROR_MSG]).inc();
            })?;

        let token = Token::new(grant.access_token, expiry_for(now, grant.expires_in, self.safety_margin_seconds));
        info!("fetched new access token, valid until {}", token.exp_unix_ts);
        self.metrics.token_fetches.with_label_values(&[SUCCESS_MSG]).inc();
        self.metrics.token_expiry_unix.set(token.exp_unix_ts);

        *slot = Some(token.clone());
        Ok(token)
    }

    /// Current slot content, valid or not. Performs no I/O.
    pub async fn cached(&self) -> Option<Token> {
        self.slot.lock().await.clone()
    }
}

/// `fetched_at + ttl - margin`. A margin larger than the TTL yields an already expired token.
pub fn expiry_for(fetched_at: i64, expires_in: u64, safety_margin_seconds: u64) -> i64 {
    fetched_at
        .saturating_add(i64::try_from(expires_in).unwrap_or(i64::MAX))
        .saturating_sub(i64::try_from(safety_margin_seconds).unwrap_or(i64::MAX))
}
