//! Ready-made evalscripts, data sources and areas for trying the tools out.

use serde_json::{json, Value};

pub const NDVI_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: ["B04", "B08", "dataMask"],
    output: { bands: 4 }
  };
}

function evaluatePixel(sample) {
  let ndvi = (sample.B08 - sample.B04) / (sample.B08 + sample.B04);
  return [sample.B04, sample.B08, ndvi, sample.dataMask];
}
"#;

pub const NDWI_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: ["B03", "B08", "dataMask"],
    output: { bands: 4 }
  };
}

function evaluatePixel(sample) {
  let ndwi = (sample.B03 - sample.B08) / (sample.B03 + sample.B08);
  return [sample.B03, sample.B08, ndwi, sample.dataMask];
}
"#;

pub const TRUE_COLOR_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: ["B04", "B03", "B02", "dataMask"],
    output: { bands: 4 }
  };
}

function evaluatePixel(sample) {
  return [sample.B04, sample.B03, sample.B02, sample.dataMask];
}
"#;

pub const FALSE_COLOR_NIR_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: ["B08", "B04", "B03", "dataMask"],
    output: { bands: 4 }
  };
}

function evaluatePixel(sample) {
  return [sample.B08, sample.B04, sample.B03, sample.dataMask];
}
"#;

pub const NDVI_STATISTICS_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: ["B04", "B08", "dataMask"],
    output: {
      bands: 1,
      sampleType: "FLOAT32"
    }
  };
}

function evaluatePixel(sample) {
  if (sample.dataMask === 0) {
    return {
      ndvi: [NaN],
      dataMask: [0]
    };
  }
  let ndvi = (sample.B08 - sample.B04) / (sample.B08 + sample.B04);
  return {
    ndvi: [ndvi],
    dataMask: [1]
  };
}
"#;

/// `(name, description, bbox)`
pub const TEST_AREAS: [(&str, &str, [f64; 4]); 4] = [
    ("rome", "Rome, Italy area", [12.4, 41.8, 12.6, 42.0]),
    ("amazon", "Amazon rainforest area", [-70.0, -10.0, -60.0, 0.0]),
    ("california", "San Francisco Bay Area", [-122.5, 37.0, -121.5, 38.0]),
    ("sahara", "Sahara Desert area", [0.0, 20.0, 10.0, 30.0]),
];

fn data_source(kind: &str, from: &str, to: &str, max_cloud_coverage: u32) -> Value {
    json!({
        "type": kind,
        "dataFilter": {
            "timeRange": {"from": from, "to": to},
            "maxCloudCoverage": max_cloud_coverage
        }
    })
}

pub fn sentinel2_data_source() -> Value {
    data_source("sentinel-2-l2a", "2023-01-01T00:00:00Z", "2023-12-31T23:59:59Z", 20)
}

pub fn landsat8_data_source() -> Value {
    data_source("landsat-8-l1c", "2023-01-01T00:00:00Z", "2023-12-31T23:59:59Z", 30)
}

/// Example tool arguments keyed by use case.
pub fn example_usage() -> Value {
    let rome = TEST_AREAS[0].2;
    json!({
        "get_ndvi_statistics": {
            "tool": "get_satellite_statistics",
            "description": "Get NDVI statistics for a specific area and time period",
            "parameters": {
                "bbox": rome,
                "time_from": "2023-06-01",
                "time_to": "2023-08-31",
                "evalscript": NDVI_STATISTICS_EVALSCRIPT,
                "data_sources": [data_source("sentinel-2-l2a", "2023-06-01T00:00:00Z", "2023-08-31T23:59:59Z", 20)],
                "aggregation": {"timeAggregation": "P1M", "aggregationFunction": "mean"}
            }
        },
        "get_water_mask": {
            "tool": "process_satellite_imagery",
            "description": "Generate a water mask using NDWI",
            "parameters": {
                "bbox": rome,
                "time_from": "2023-07-01",
                "time_to": "2023-07-31",
                "evalscript": NDWI_EVALSCRIPT,
                "data_sources": [data_source("sentinel-2-l2a", "2023-07-01T00:00:00Z", "2023-07-31T23:59:59Z", 30)],
                "width": 512,
                "height": 512
            }
        },
        "get_true_color_image": {
            "tool": "process_satellite_imagery",
            "description": "Generate a true color RGB image",
            "parameters": {
                "bbox": rome,
                "time_from": "2023-07-15",
                "time_to": "2023-07-15",
                "evalscript": TRUE_COLOR_EVALSCRIPT,
                "data_sources": [data_source("sentinel-2-l2a", "2023-07-15T00:00:00Z", "2023-07-15T23:59:59Z", 10)],
                "width": 1024,
                "height": 1024
            }
        }
    })
}

/// Everything above as one JSON document, served at `/examples`.
pub fn catalog() -> Value {
    let areas: serde_json::Map<String, Value> = TEST_AREAS
        .iter()
        .map(|(name, description, bbox)| {
            (name.to_string(), json!({"bbox": bbox, "description": description}))
        })
        .collect();

    json!({
        "evalscripts": {
            "ndvi": NDVI_EVALSCRIPT,
            "ndwi": NDWI_EVALSCRIPT,
            "true_color": TRUE_COLOR_EVALSCRIPT,
            "false_color_nir": FALSE_COLOR_NIR_EVALSCRIPT,
            "ndvi_statistics": NDVI_STATISTICS_EVALSCRIPT
        },
        "data_sources": {
            "sentinel2": sentinel2_data_source(),
            "landsat8": landsat8_data_source()
        },
        "test_areas": areas,
        "example_usage": example_usage()
    })
}
