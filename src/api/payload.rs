//! Tool arguments and the request bodies built from them.
//!
//! Both tools share the same area/time/script arguments and validate them in
//! the same order: time range, evalscript, data sources, then area.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ToolError;

pub const DEFAULT_OUTPUT_FORMAT: &str = "image/png";

/// Arguments common to the statistics and processing tools.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageryArgs {
    pub geometry: Option<Value>,
    pub bbox: Option<Vec<f64>>,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
    pub evalscript: Option<String>,
    pub data_sources: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsArgs {
    #[serde(flatten)]
    pub imagery: ImageryArgs,
    pub aggregation: Option<Value>,
    pub calculations: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessArgs {
    #[serde(flatten)]
    pub imagery: ImageryArgs,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub output_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

/// Area of interest; geometry wins when both are given.
#[derive(Debug, Clone, PartialEq)]
pub enum Area {
    Geometry(Value),
    BBox(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsPayload {
    pub time: TimeRange,
    pub evalscript: String,
    pub data: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculations: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessPayload {
    pub time: TimeRange,
    pub evalscript: String,
    pub data: Vec<Value>,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Summary echoed back in successful tool results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestInfo {
    pub time_range: String,
    pub data_sources: usize,
    pub has_geometry: bool,
    pub has_bbox: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

/// Validated form of [`ImageryArgs`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImageryRequest {
    pub time: TimeRange,
    pub evalscript: String,
    pub data: Vec<Value>,
    pub area: Area,
    has_geometry: bool,
    has_bbox: bool,
}

impl ImageryArgs {
    pub fn validate(self) -> Result<ImageryRequest, ToolError> {
        let time_from = self.time_from.filter(|v| !v.is_empty());
        let time_to = self.time_to.filter(|v| !v.is_empty());
        let (Some(from), Some(to)) = (time_from, time_to) else {
            return Err(invalid("time_from and time_to are required"));
        };
        let evalscript = self
            .evalscript
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid("evalscript is required"))?;
        let data = self
            .data_sources
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid("data_sources is required"))?;

        // reported as given, even when the value is too empty to use
        let (has_geometry, has_bbox) = (self.geometry.is_some(), self.bbox.is_some());
        let geometry = self.geometry.filter(is_present);
        let bbox = self.bbox.filter(|v| !v.is_empty());
        let area = match (geometry, bbox) {
            (Some(geometry), _) => Area::Geometry(geometry),
            (None, Some(bbox)) => Area::BBox(bbox),
            (None, None) => return Err(invalid("Either geometry or bbox must be provided")),
        };

        Ok(ImageryRequest {
            time: TimeRange { from, to },
            evalscript,
            data,
            area,
            has_geometry,
            has_bbox,
        })
    }
}

impl ImageryRequest {
    pub fn request_info(&self, output_format: Option<&str>) -> RequestInfo {
        RequestInfo {
            time_range: format!("{} to {}", self.time.from, self.time.to),
            data_sources: self.data.len(),
            has_geometry: self.has_geometry,
            has_bbox: self.has_bbox,
            output_format: output_format.map(str::to_owned),
        }
    }

    fn split_area(&self) -> (Option<Value>, Option<Vec<f64>>) {
        match &self.area {
            Area::Geometry(geometry) => (Some(geometry.clone()), None),
            Area::BBox(bbox) => (None, Some(bbox.clone())),
        }
    }
}

impl StatisticsArgs {
    pub fn into_request(self) -> Result<(StatisticsPayload, RequestInfo), ToolError> {
        let request = self.imagery.validate()?;
        let info = request.request_info(None);
        let (geometry, bbox) = request.split_area();

        let payload = StatisticsPayload {
            time: request.time,
            evalscript: request.evalscript,
            data: request.data,
            geometry,
            bbox,
            aggregation: self.aggregation.filter(is_present),
            calculations: self.calculations.filter(is_present),
        };
        Ok((payload, info))
    }
}

impl ProcessArgs {
    pub fn into_request(self) -> Result<(ProcessPayload, RequestInfo), ToolError> {
        let request = self.imagery.validate()?;
        let format = self
            .output_format
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_owned());
        let info = request.request_info(Some(&format));
        let (geometry, bbox) = request.split_area();

        let payload = ProcessPayload {
            time: request.time,
            evalscript: request.evalscript,
            data: request.data,
            format,
            geometry,
            bbox,
            width: self.width.filter(|v| *v > 0),
            height: self.height.filter(|v| *v > 0),
        };
        Ok((payload, info))
    }
}

/// null, `{}` and `[]` count as "not provided".
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn invalid(message: &str) -> ToolError {
    ToolError::InvalidArguments(message.to_owned())
}
