//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 60;
pub const DEFAULT_TOKEN_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_API_TIMEOUT_MS: u64 = 60_000;
/// used when the token endpoint omits `expires_in`
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

pub const SENTINELHUB_BASE_URL: &str = "https://services.sentinel-hub.com/api/v1";
pub const SENTINELHUB_OAUTH_URL: &str = "https://services.sentinel-hub.com/oauth/token";

pub const ENV_CLIENT_ID: &str = "SENTINELHUB_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SENTINELHUB_CLIENT_SECRET";

pub const SERVER_NAME: &str = "SentinelHub MCP Server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
