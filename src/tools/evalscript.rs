//! Lightweight static checks for EVALSCRIPT snippets.
//!
//! These are string heuristics only; the script is never parsed or run.

use serde::Serialize;

use crate::errors::ToolError;

const INDEX_NAMES: [&str; 4] = ["ndvi", "ndwi", "ndbi", "evi"];
const BAND_NAMES: [&str; 13] = [
    "b01", "b02", "b03", "b04", "b05", "b06", "b07", "b08", "b8a", "b09", "b10", "b11", "b12",
];
const MIN_REASONABLE_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvalscriptChecks {
    pub not_empty: bool,
    pub has_return_statement: bool,
    pub has_function_definition: bool,
    pub length: usize,
    pub line_count: usize,
    pub uses_sample: bool,
    pub uses_index: bool,
    pub uses_bands: bool,
    pub uses_visualize: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvalscriptReport {
    pub success: bool,
    pub checks: EvalscriptChecks,
    pub recommendations: Vec<String>,
}

pub fn validate_evalscript(script: &str) -> Result<EvalscriptReport, ToolError> {
    if script.trim().is_empty() {
        return Err(ToolError::InvalidArguments("EVALSCRIPT cannot be empty".to_owned()));
    }

    let lower = script.to_lowercase();
    let checks = EvalscriptChecks {
        not_empty: true,
        has_return_statement: script.contains("return"),
        has_function_definition: ["function", "=>", "evalPixel"].iter().any(|k| script.contains(k)),
        length: script.chars().count(),
        line_count: script.split('\n').count(),
        uses_sample: lower.contains("sample"),
        uses_index: INDEX_NAMES.iter().any(|k| lower.contains(k)),
        uses_bands: BAND_NAMES.iter().any(|k| lower.contains(k)),
        uses_visualize: lower.contains("visualize"),
    };

    let mut recommendations = Vec::new();
    if !checks.has_return_statement {
        recommendations.push("EVALSCRIPT should include a return statement".to_owned());
    }
    if !checks.has_function_definition {
        recommendations.push("EVALSCRIPT should define a function (e.g., evalPixel)".to_owned());
    }
    if checks.length < MIN_REASONABLE_LENGTH {
        recommendations.push(
            "EVALSCRIPT seems too short - ensure it contains proper processing logic".to_owned(),
        );
    }

    Ok(EvalscriptReport { success: true, checks, recommendations })
}
