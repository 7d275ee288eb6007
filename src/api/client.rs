use std::sync::Arc;
use std::time::Duration;

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::api::payload::{ProcessPayload, StatisticsPayload};
use crate::cache::token_cache::CredentialTokenCache;
use crate::config::sources::SentinelHubConfig;
use crate::errors::ApiError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::{Metrics, ERROR_MSG};

static STATISTICS_ENDPOINT: &str = "statistics";
static PROCESS_ENDPOINT: &str = "process";
static DATA_ENDPOINT: &str = "data";

/// Body returned by the Processing API.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutput {
    Image { bytes: Vec<u8>, content_type: String },
    Json { value: Value, content_type: String },
}

/// Outbound Sentinel Hub calls. Every call takes one token from the cache.
pub struct SentinelHubClient {
    client: Client,
    base_url: String,
    tokens: Arc<CredentialTokenCache>,
    metrics: Arc<Metrics>,
}

impl SentinelHubClient {
    pub fn new(
        config: &SentinelHubConfig,
        tokens: Arc<CredentialTokenCache>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.api_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            tokens,
            metrics,
        })
    }

    pub fn tokens(&self) -> &Arc<CredentialTokenCache> {
        &self.tokens
    }

    /// `POST /statistics`
    pub async fn statistics(&self, payload: &StatisticsPayload) -> Result<Value, ApiError> {
        let response = self.execute(Method::POST, STATISTICS_ENDPOINT, Some(payload)).await?;
        let value = decode_json(response).await?;
        let data_points = value.get("data").and_then(Value::as_array).map_or(0, Vec::len);
        info!("Statistical API request successful: {} data points", data_points);
        Ok(value)
    }

    /// `POST /process`; image bodies come back raw, anything else is parsed as JSON.
    pub async fn process(&self, payload: &ProcessPayload) -> Result<ProcessOutput, ApiError> {
        let response = self.execute(Method::POST, PROCESS_ENDPOINT, Some(payload)).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        info!("Processing API request successful: {}", content_type);

        if content_type.contains("image/") {
            let bytes = response.bytes().await?.to_vec();
            Ok(ProcessOutput::Image { bytes, content_type })
        } else {
            let value = decode_json(response).await?;
            Ok(ProcessOutput::Json { value, content_type })
        }
    }

    /// `GET /data`
    pub async fn data_sources(&self) -> Result<Value, ApiError> {
        let response = self.execute::<()>(Method::GET, DATA_ENDPOINT, None).await?;
        decode_json(response).await
    }

    async fn execute<T: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &'static str,
        body: Option<&T>,
    ) -> Result<Response, ApiError> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut request = self
            .client
            .request(method, &url)
            .header(AUTHORIZATION, token.bearer());
        if let Some(body) = body {
            request = request.json(body);
        }

        let start = get_instant();
        let result = request.send().await;
        self.metrics
            .api_duration
            .with_label_values(&[endpoint])
            .observe(start.elapsed().as_secs_f64());

        let response = result.inspect_err(|e| {
            error!("API request to {} failed: {}", url, e);
            self.metrics.api_requests.with_label_values(&[endpoint, ERROR_MSG]).inc();
        })?;

        let status = response.status();
        self.metrics
            .api_requests
            .with_label_values(&[endpoint, status.as_str()])
            .inc();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("API request to {} failed: {}", url, status);
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }
}

async fn decode_json(response: Response) -> Result<Value, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
