use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::tools::{descriptors, ToolRegistry};
use crate::utils::constants::{MCP_PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// absent for notifications
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0".to_owned(), id, result: Some(result), error: None }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_owned(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message: message.into() }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unknown method: {0}")]
    MethodNotFound(String),
    #[error("{0}")]
    InvalidParams(String),
}

impl ProtocolError {
    pub fn code(&self) -> i64 {
        match self {
            ProtocolError::MethodNotFound(_) => METHOD_NOT_FOUND,
            ProtocolError::InvalidParams(_) => INVALID_PARAMS,
        }
    }
}

/// Method dispatch shared by the stdio and HTTP transports.
pub struct McpHandler {
    tools: Arc<ToolRegistry>,
}

impl McpHandler {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub async fn handle(&self, method: &str, params: Value) -> Result<Value, ProtocolError> {
        debug!("mcp method '{}'", method);
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {"tools": {"listChanged": false}},
                "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION}
            })),
            "ping" | "notifications/initialized" => Ok(json!({})),
            "tools/list" => Ok(json!({"tools": descriptors()})),
            "tools/call" => self.call_tool(params).await,
            other => Err(ProtocolError::MethodNotFound(other.to_owned())),
        }
    }

    /// `None` for notifications, which get no reply.
    pub async fn handle_jsonrpc(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let result = self.handle(&request.method, request.params).await;
        let id = request.id?;
        Some(match result {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::failure(id, e.code(), e.to_string()),
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, ProtocolError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::InvalidParams("tools/call requires a tool name".to_owned()))?;
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let outcome = self
            .tools
            .call(name, arguments)
            .await
            .map_err(|e| ProtocolError::InvalidParams(e.to_string()))?;

        Ok(json!({
            "content": [{"type": "text", "text": outcome.envelope.to_string()}],
            "isError": outcome.is_error
        }))
    }
}
