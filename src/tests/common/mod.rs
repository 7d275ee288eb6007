// tests/common/mod.rs
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Router};
use reqwest::Client;

use crate::api::client::SentinelHubClient;
use crate::cache::token_cache::CredentialTokenCache;
use crate::config::sources::{Credentials, SentinelHubConfig};
use crate::helpers::time::ManualClock;
use crate::mcp::protocol::McpHandler;
use crate::observability::metrics::Metrics;
use crate::tools::ToolRegistry;

pub const CLOCK_START: i64 = 1_700_000_000;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// What the fake token endpoint answers with.
#[derive(Debug, Clone)]
pub enum TokenReply {
    /// `{"access_token": "token-<n>", "expires_in": ...}` where n counts requests
    Issue { expires_in: Option<u64> },
    Status(StatusCode),
    Body(String),
}

/// In-process OAuth token endpoint counting every request it sees.
#[derive(Clone)]
pub struct TokenEndpoint {
    pub url: String,
    hits: Arc<AtomicUsize>,
    reply: Arc<Mutex<TokenReply>>,
    last_form: Arc<Mutex<Option<HashMap<String, String>>>>,
    delay: Duration,
}

impl TokenEndpoint {
    pub async fn start(expires_in: Option<u64>) -> (Self, JoinHandle<()>) {
        Self::start_with_delay(expires_in, Duration::ZERO).await
    }

    pub async fn start_with_delay(expires_in: Option<u64>, delay: Duration) -> (Self, JoinHandle<()>) {
        let mut endpoint = Self {
            url: String::new(),
            hits: Arc::new(AtomicUsize::new(0)),
            reply: Arc::new(Mutex::new(TokenReply::Issue { expires_in })),
            last_form: Arc::new(Mutex::new(None)),
            delay,
        };
        let router = Router::new()
            .route("/oauth/token", post(issue_token))
            .with_state(endpoint.clone());
        let (handle, addr) = spawn_axum(router).await;
        endpoint.url = format!("http://{}/oauth/token", addr);
        (endpoint, handle)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn reply_with(&self, reply: TokenReply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn last_form(&self) -> Option<HashMap<String, String>> {
        self.last_form.lock().unwrap().clone()
    }
}

async fn issue_token(
    State(endpoint): State<TokenEndpoint>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, String) {
    let n = endpoint.hits.fetch_add(1, Ordering::SeqCst) + 1;
    *endpoint.last_form.lock().unwrap() = Some(form);
    if !endpoint.delay.is_zero() {
        tokio::time::sleep(endpoint.delay).await;
    }

    let reply = endpoint.reply.lock().unwrap().clone();
    match reply {
        TokenReply::Issue { expires_in } => {
            let mut body = json!({ "access_token": format!("token-{}", n), "token_type": "Bearer" });
            if let Some(expires_in) = expires_in {
                body["expires_in"] = json!(expires_in);
            }
            (StatusCode::OK, body.to_string())
        }
        TokenReply::Status(status) => (status, json!({ "error": "invalid_client" }).to_string()),
        TokenReply::Body(body) => (StatusCode::OK, body),
    }
}

pub fn test_credentials() -> Credentials {
    Credentials::new("test-client", "test-secret")
}

pub fn sentinelhub_config(base_url: &str, oauth_url: &str, credentials: Credentials) -> SentinelHubConfig {
    SentinelHubConfig {
        base_url: base_url.to_owned(),
        oauth_url: oauth_url.to_owned(),
        credentials,
        ..SentinelHubConfig::default()
    }
}

/// Everything below the transports, wired with a manual clock.
pub struct Stack {
    pub clock: Arc<ManualClock>,
    pub metrics: Arc<Metrics>,
    pub tokens: Arc<CredentialTokenCache>,
    pub tools: Arc<ToolRegistry>,
    pub handler: Arc<McpHandler>,
}

pub fn build_stack(config: &SentinelHubConfig) -> Stack {
    let clock = Arc::new(ManualClock::new(CLOCK_START));
    let metrics = Metrics::new().expect("metrics");
    let tokens = Arc::new(
        CredentialTokenCache::new(config, clock.clone(), metrics.clone()).expect("token cache"),
    );
    let api = Arc::new(SentinelHubClient::new(config, tokens.clone(), metrics.clone()).expect("api client"));
    let tools = Arc::new(ToolRegistry::new(api, metrics.clone()));
    let handler = Arc::new(McpHandler::new(tools.clone()));
    Stack { clock, metrics, tokens, tools, handler }
}
