//! Tool registry: descriptors plus the one dispatch path used by every transport.

pub mod catalog;
pub mod evalscript;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::client::{ProcessOutput, SentinelHubClient};
use crate::api::payload::{ProcessArgs, StatisticsArgs};
use crate::errors::ToolError;
use crate::observability::metrics::{Metrics, ERROR_MSG, SUCCESS_MSG};

pub const GET_SATELLITE_STATISTICS: &str = "get_satellite_statistics";
pub const PROCESS_SATELLITE_IMAGERY: &str = "process_satellite_imagery";
pub const GET_AVAILABLE_DATA_SOURCES: &str = "get_available_data_sources";
pub const VALIDATE_EVALSCRIPT: &str = "validate_evalscript";

pub const TOOL_NAMES: [&str; 4] = [
    GET_SATELLITE_STATISTICS,
    PROCESS_SATELLITE_IMAGERY,
    GET_AVAILABLE_DATA_SOURCES,
    VALIDATE_EVALSCRIPT,
];

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// argument names in presentation order
    #[serde(skip)]
    pub parameters: &'static [&'static str],
}

/// Result envelope of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub envelope: Value,
    pub is_error: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown tool: {0}")]
pub struct UnknownTool(pub String);

pub fn descriptors() -> Vec<ToolDescriptor> {
    let area_and_time = json!({
        "geometry": {"type": "object", "description": "GeoJSON geometry for area of interest"},
        "bbox": {"type": "array", "description": "Bounding box as [minX, minY, maxX, maxY]"},
        "time_from": {"type": "string", "description": "Start date in ISO format"},
        "time_to": {"type": "string", "description": "End date in ISO format"},
        "evalscript": {"type": "string", "description": "JavaScript code for data processing"},
        "data_sources": {"type": "array", "description": "List of data source specifications"}
    });
    let required = json!(["time_from", "time_to", "evalscript", "data_sources"]);

    let mut statistics = area_and_time.clone();
    extend(&mut statistics, json!({
        "aggregation": {"type": "object", "description": "Aggregation parameters"},
        "calculations": {"type": "object", "description": "Calculation parameters"}
    }));
    let mut process = area_and_time;
    extend(&mut process, json!({
        "width": {"type": "integer", "description": "Output image width"},
        "height": {"type": "integer", "description": "Output image height"},
        "output_format": {"type": "string", "description": "Output format"}
    }));

    vec![
        ToolDescriptor {
            name: GET_SATELLITE_STATISTICS,
            description: "Get statistical data from satellite imagery using SentinelHub's Statistical API",
            input_schema: json!({"type": "object", "properties": statistics, "required": required}),
            parameters: &["geometry", "bbox", "time_from", "time_to", "evalscript", "data_sources", "aggregation", "calculations"],
        },
        ToolDescriptor {
            name: PROCESS_SATELLITE_IMAGERY,
            description: "Generate processed images from satellite data using SentinelHub's Processing API",
            input_schema: json!({"type": "object", "properties": process, "required": required}),
            parameters: &["geometry", "bbox", "time_from", "time_to", "evalscript", "data_sources", "width", "height", "output_format"],
        },
        ToolDescriptor {
            name: GET_AVAILABLE_DATA_SOURCES,
            description: "Get information about available data sources in SentinelHub",
            input_schema: json!({"type": "object", "properties": {}}),
            parameters: &[],
        },
        ToolDescriptor {
            name: VALIDATE_EVALSCRIPT,
            description: "Validate an EVALSCRIPT for SentinelHub processing",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "evalscript": {"type": "string", "description": "JavaScript code to validate"}
                },
                "required": ["evalscript"]
            }),
            parameters: &["evalscript"],
        },
    ]
}

fn extend(target: &mut Value, extra: Value) {
    if let (Some(target), Value::Object(extra)) = (target.as_object_mut(), extra) {
        target.extend(extra);
    }
}

pub struct ToolRegistry {
    api: Arc<SentinelHubClient>,
    metrics: Arc<Metrics>,
}

impl ToolRegistry {
    pub fn new(api: Arc<SentinelHubClient>, metrics: Arc<Metrics>) -> Self {
        Self { api, metrics }
    }

    pub fn credentials_configured(&self) -> bool {
        self.api.tokens().credentials_configured()
    }

    /// Runs a tool by name. Tool failures come back inside the envelope; only an unknown name is an `Err`.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolOutcome, UnknownTool> {
        let result = match name {
            GET_SATELLITE_STATISTICS => self.satellite_statistics(arguments).await,
            PROCESS_SATELLITE_IMAGERY => self.process_imagery(arguments).await,
            GET_AVAILABLE_DATA_SOURCES => self.available_data_sources().await,
            VALIDATE_EVALSCRIPT => validate_evalscript_tool(arguments),
            other => return Err(UnknownTool(other.to_owned())),
        };

        let outcome = match result {
            Ok(envelope) => {
                info!(tool = name, "tool call succeeded");
                ToolOutcome { envelope, is_error: false }
            }
            Err(e) => {
                error!(tool = name, error_type = e.error_type(), "tool call failed: {}", e);
                ToolOutcome {
                    envelope: json!({
                        "success": false,
                        "error": e.to_string(),
                        "error_type": e.error_type(),
                    }),
                    is_error: true,
                }
            }
        };
        let label = if outcome.is_error { ERROR_MSG } else { SUCCESS_MSG };
        self.metrics.tool_calls.with_label_values(&[name, label]).inc();
        Ok(outcome)
    }

    async fn satellite_statistics(&self, arguments: Value) -> Result<Value, ToolError> {
        let (payload, request_info) = parse_arguments::<StatisticsArgs>(arguments)?.into_request()?;
        let data = self.api.statistics(&payload).await?;

        Ok(json!({
            "success": true,
            "data": data,
            "request_info": request_info,
        }))
    }

    async fn process_imagery(&self, arguments: Value) -> Result<Value, ToolError> {
        let (payload, request_info) = parse_arguments::<ProcessArgs>(arguments)?.into_request()?;

        let envelope = match self.api.process(&payload).await? {
            ProcessOutput::Image { bytes, content_type } => json!({
                "success": true,
                "image_data": STANDARD.encode(&bytes),
                "content_type": content_type,
                "size_bytes": bytes.len(),
                "request_info": request_info,
            }),
            ProcessOutput::Json { value, content_type } => json!({
                "success": true,
                "data": value,
                "content_type": content_type,
                "request_info": request_info,
            }),
        };
        Ok(envelope)
    }

    async fn available_data_sources(&self) -> Result<Value, ToolError> {
        let data_sources = self.api.data_sources().await?;
        let count = data_sources.as_array().map(Vec::len).unwrap_or(1);

        Ok(json!({
            "success": true,
            "data_sources": data_sources,
            "count": count,
        }))
    }
}

fn validate_evalscript_tool(arguments: Value) -> Result<Value, ToolError> {
    let script = arguments
        .get("evalscript")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let report = evalscript::validate_evalscript(script)?;
    serde_json::to_value(report).map_err(|e| ToolError::Unexpected(e.to_string()))
}

fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidArguments(format!("invalid arguments: {}", e)))
}
