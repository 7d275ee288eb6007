//! # Sentinel Hub MCP Library
//!
//! Exposes Sentinel Hub's Statistical, Processing and catalog APIs as
//! MCP tools, backed by a cached OAuth2 client-credentials token.
//!
//! Modules:
//! - `config` — service configuration, credentials and YAML loading
//! - `cache` — access token slot and its lifecycle
//! - `sources` — OAuth2 token endpoint client
//! - `api` — outbound Sentinel Hub calls and payload assembly
//! - `tools` — tool registry, evalscript checks and the example catalog
//! - `mcp` — protocol dispatch over stdio and HTTP
//! - `server` — web front-end

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod mcp;
pub mod observability;
pub mod server;
pub mod sources;
pub mod tests;
pub mod tools;
pub mod utils;


pub use crate::config::sources::ServiceConfig;
pub use crate::cache::token_cache::CredentialTokenCache;
