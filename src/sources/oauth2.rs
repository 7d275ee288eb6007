use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::TokenError;
use crate::utils::constants::DEFAULT_TOKEN_TTL_SECS;

/// Token endpoint response; both fields optional so a missing token is reported, not a serde error.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
}

/// OAuth2 client-credentials grant against `token_url`.
pub async fn fetch_client_credentials(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<TokenGrant, TokenError> {
    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ];
    debug!("requesting token from {}", token_url);

    let response = client
        .post(token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| TokenError::Authentication(format!("token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("token endpoint returned {}", status);
        return Err(TokenError::Authentication(format!(
            "OAuth2 token request failed: {} {}",
            status,
            body.trim()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| TokenError::Authentication(format!("failed to read token response: {}", e)))?;
    parse_token_response(&body)
}

pub fn parse_token_response(body: &str) -> Result<TokenGrant, TokenError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| TokenError::Authentication(format!("malformed token response: {}", e)))?;

    let access_token = parsed
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| TokenError::Authentication("token response has no access_token".to_owned()))?;

    Ok(TokenGrant {
        access_token,
        expires_in: parsed.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
    })
}
