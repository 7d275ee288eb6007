use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use sentinelhub_mcp::api::client::SentinelHubClient;
use sentinelhub_mcp::cache::token_cache::CredentialTokenCache;
use sentinelhub_mcp::helpers::time::SystemClock;
use sentinelhub_mcp::mcp::protocol::McpHandler;
use sentinelhub_mcp::mcp::stdio;
use sentinelhub_mcp::observability::metrics::Metrics;
use sentinelhub_mcp::server;
use sentinelhub_mcp::server::server::AppState;
use sentinelhub_mcp::tools::ToolRegistry;
use sentinelhub_mcp::utils::config_loader;
use sentinelhub_mcp::utils::logging;
use sentinelhub_mcp::utils::logging::LogLevel;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// MCP over stdin/stdout only
    Stdio,
    /// web front-end and HTTP MCP endpoint only
    Http,
    /// both transports
    All,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, env = "MCP_MODE", value_enum)]
    mode: Option<Mode>,
    /// overrides settings.server.port
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load config, init logging
    // -------------------------------

    let args = Args::parse();
    let mut service_config = config_loader::run(args.config.as_deref()).await?;
    logging::run(&service_config, args.log_level)?;

    if let Some(port) = args.port {
        service_config.settings.server.port = port.to_string();
    }
    // a PORT means we are deployed behind HTTP; serve both transports there
    let mode = args.mode.unwrap_or(if args.port.is_some() { Mode::All } else { Mode::Stdio });

    // -------------------------------
    // 2. Token cache and API client
    // -------------------------------

    let metrics = Metrics::new()?;
    let sentinelhub = &service_config.sentinelhub;
    let tokens = Arc::new(CredentialTokenCache::new(sentinelhub, Arc::new(SystemClock), metrics.clone())?);
    if !tokens.credentials_configured() {
        warn!("Sentinel Hub credentials are not configured; API tools will fail until they are set");
    }
    let api = Arc::new(SentinelHubClient::new(sentinelhub, tokens, metrics.clone())?);

    // -------------------------------
    // 3. Tools and protocol dispatch
    // -------------------------------

    let tools = Arc::new(ToolRegistry::new(api, metrics.clone()));
    let handler = Arc::new(McpHandler::new(tools));

    // -------------------------------
    // 4. Transports
    // -------------------------------

    info!("Service starting in {:?} mode...", mode);
    let settings = service_config.settings.clone();
    let http_server = server::server::start(&settings, AppState::new(metrics.clone(), handler.clone()));

    match mode {
        // stdin EOF ends a stdio-only session
        Mode::Stdio => stdio::run(handler).await?,
        Mode::Http => http_server.await?,
        // the web server keeps running after stdin closes or fails
        Mode::All => {
            let stdio_server = async {
                if let Err(e) = stdio::run(handler.clone()).await {
                    error!("stdio transport stopped: {:#}", e);
                }
                Ok::<(), anyhow::Error>(())
            };
            tokio::try_join!(http_server, stdio_server)?;
        }
    }

    Ok(())
}
