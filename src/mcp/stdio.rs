use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, McpHandler, INVALID_REQUEST, PARSE_ERROR};

/// Newline-delimited JSON-RPC on the process' stdin/stdout.
pub async fn run(handler: Arc<McpHandler>) -> Result<()> {
    info!("serving MCP over stdio");
    serve(handler, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Reads one request per line until EOF, writing one response line per non-notification.
pub async fn serve<R, W>(handler: Arc<McpHandler>, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut frame = Vec::new();

    loop {
        frame.clear();
        if reader.read_until(b'\n', &mut frame).await? == 0 {
            break;
        }
        if frame.trim_ascii().is_empty() {
            continue;
        }

        let response = match serde_json::from_slice::<Value>(&frame) {
            Err(e) => {
                warn!("unparseable frame: {}", e);
                Some(JsonRpcResponse::failure(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)))
            }
            Ok(value) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                match serde_json::from_value::<JsonRpcRequest>(value) {
                    Ok(request) => handler.handle_jsonrpc(request).await,
                    Err(e) => Some(JsonRpcResponse::failure(id, INVALID_REQUEST, format!("Invalid request: {}", e))),
                }
            }
        };

        if let Some(response) = response {
            let mut reply = serde_json::to_string(&response)?;
            reply.push('\n');
            writer.write_all(reply.as_bytes()).await?;
            writer.flush().await?;
        }
    }

    info!("stdin closed, stopping stdio transport");
    Ok(())
}
