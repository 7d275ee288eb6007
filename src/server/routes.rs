use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, INVALID_REQUEST};
use crate::server::server::AppState;
use crate::tools::{catalog, descriptors, TOOL_NAMES};
use crate::utils::constants::{SERVER_NAME, SERVER_VERSION};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/examples", get(examples))
        .route("/mcp", post(handle_mcp))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": SERVER_VERSION,
        "credentials_configured": state.mcp.tools().credentials_configured(),
        "mcp_tools": TOOL_NAMES,
    }))
}

async fn list_tools() -> Json<Value> {
    let tools: Vec<Value> = descriptors()
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            })
        })
        .collect();
    Json(json!({ "tools": tools }))
}

async fn examples() -> Json<Value> {
    Json(catalog::catalog())
}

/// Requests carrying `jsonrpc` get a JSON-RPC envelope; plain `{method, params}` bodies get the bare result.
/// Every failure, an unparseable body included, is answered in JSON.
async fn handle_mcp(State(state): State<AppState>, body: Bytes) -> Response {
    let body = match serde_json::from_slice::<Value>(&body) {
        Ok(body) => body,
        Err(e) => {
            warn!("unparseable mcp http body: {}", e);
            return Json(json!({ "error": format!("Parse error: {}", e) })).into_response();
        }
    };
    let is_jsonrpc = body.get("jsonrpc").is_some();
    let id = body.get("id").cloned().unwrap_or(Value::Null);

    let request = match serde_json::from_value::<JsonRpcRequest>(body) {
        Ok(request) => request,
        Err(e) if is_jsonrpc => {
            return Json(JsonRpcResponse::failure(id, INVALID_REQUEST, format!("Invalid request: {}", e)))
                .into_response()
        }
        Err(e) => return Json(json!({ "error": e.to_string() })).into_response(),
    };
    info!("mcp http request: {}", request.method);

    if is_jsonrpc {
        return match state.mcp.handle_jsonrpc(request).await {
            Some(response) => Json(response).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        };
    }

    match state.mcp.handle(&request.method, request.params).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => Json(json!({ "error": e.to_string() })).into_response(),
    }
}

async fn index() -> Html<String> {
    let tools: String = descriptors()
        .iter()
        .map(|tool| {
            format!(
                "                <div class=\"tool\">\n                    <strong>{}</strong> - {}\n                </div>\n",
                tool.name, tool.description
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{name}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; background-color: #f5f5f5; }}
        .container {{ max-width: 800px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        h1 {{ color: #2c3e50; }}
        .status {{ background: #e8f5e8; padding: 15px; border-radius: 5px; margin: 20px 0; }}
        .tools {{ background: #f8f9fa; padding: 15px; border-radius: 5px; margin: 20px 0; }}
        .tool {{ margin: 10px 0; padding: 10px; background: white; border-left: 4px solid #3498db; }}
        .footer {{ margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>🛰️ {name}</h1>
        <div class="status">
            <h3>✅ Server Status: Running</h3>
            <p>This MCP server provides access to SentinelHub's Statistical and Processing APIs through the Model Context Protocol.</p>
        </div>
        <div class="tools">
            <h3>🔧 Available MCP Tools</h3>
{tools}        </div>
        <div class="footer">
            <p><strong>Version:</strong> {version}</p>
            <p><strong>Health Check:</strong> <a href="/health">/health</a></p>
            <p><strong>Examples:</strong> <a href="/examples">/examples</a></p>
        </div>
    </div>
</body>
</html>
"#,
        name = SERVER_NAME,
        version = SERVER_VERSION,
        tools = tools,
    ))
}
