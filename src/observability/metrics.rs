use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use tracing::info;

pub static SUCCESS_MSG: &str = "success";
pub static ERROR_MSG: &str = "error";

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_fetches: IntCounterVec,
    pub token_cache_hits: IntCounter,
    pub token_expiry_unix: IntGauge,

    // Upstream API metrics
    pub api_requests: IntCounterVec,
    pub api_duration: HistogramVec,

    // Tool metrics
    pub tool_calls: IntCounterVec,

    pub up: IntGauge,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Arc<Self>> {
        info!("Initializing Metrics ...");
        let registry = Registry::new_custom(Some("sentinelhub_mcp".into()), None)?;

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token
            token_fetches: IntCounterVec::new(Opts::new("token_fetches_total", "Token endpoint calls by outcome"), &["outcome"])?,
            token_cache_hits: IntCounter::new("token_cache_hits_total", "get_token calls served from the cached slot")?,
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Buffer-adjusted expiry of the cached token")?,

            // Upstream API
            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "Sentinel Hub API requests"), &["endpoint", "status"])?,
            api_duration: HistogramVec::new(HistogramOpts::new("api_request_duration_seconds", "Sentinel Hub API request duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]), &["endpoint"])?,

            // Tools
            tool_calls: IntCounterVec::new(Opts::new("tool_calls_total", "Tool invocations by outcome"), &["tool", "outcome"])?,

            up: IntGauge::new("up", "1 if service is healthy")?,

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_fetches.clone()))?;
        reg.register(Box::new(metrics.token_cache_hits.clone()))?;
        reg.register(Box::new(metrics.token_expiry_unix.clone()))?;
        reg.register(Box::new(metrics.api_requests.clone()))?;
        reg.register(Box::new(metrics.api_duration.clone()))?;
        reg.register(Box::new(metrics.tool_calls.clone()))?;
        reg.register(Box::new(metrics.up.clone()))?;

        Ok(metrics)
    }
}
