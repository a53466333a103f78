use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error_handler::{ConfigError, RecommendError};

/// Grounding tool attached to a `generateContent` call.
///
/// Exactly one tool is active per request. Maps grounding can additionally be
/// biased toward the caller's coordinates.
///
/// # Examples
///
/// ```
/// use recommend_service::config::grounding_tool::GroundingTool;
///
/// let tool: GroundingTool = "maps".parse().unwrap();
/// assert_eq!(tool, GroundingTool::GoogleMaps);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GroundingTool {
    /// Google Search grounding (`tools: [{ googleSearch: {} }]`).
    GoogleSearch,
    /// Google Maps grounding (`tools: [{ googleMaps: {} }]`).
    GoogleMaps,
}

impl FromStr for GroundingTool {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" | "google_search" | "googlesearch" | "web" => Ok(Self::GoogleSearch),
            "maps" | "google_maps" | "googlemaps" => Ok(Self::GoogleMaps),
            other => Err(ConfigError::UnsupportedValue {
                var: "GEMINI_GROUNDING",
                value: other.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for GroundingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroundingTool::GoogleSearch => f.write_str("search"),
            GroundingTool::GoogleMaps => f.write_str("maps"),
        }
    }
}

/// How the model is asked to shape its answer, and therefore which extraction
/// path the normalizer expects to hit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputMode {
    /// Free text ending with a fenced ```json block (works with every tool).
    FencedJson,
    /// `responseMimeType: application/json` plus a response schema.
    SchemaJson,
    /// Prose only; restaurants come from grounding metadata chunks.
    GroundingChunks,
}

impl FromStr for OutputMode {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fenced" | "fenced_json" | "text" => Ok(Self::FencedJson),
            "schema" | "schema_json" | "json" => Ok(Self::SchemaJson),
            "chunks" | "grounding_chunks" => Ok(Self::GroundingChunks),
            other => Err(ConfigError::UnsupportedValue {
                var: "GEMINI_OUTPUT_MODE",
                value: other.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::FencedJson => f.write_str("fenced"),
            OutputMode::SchemaJson => f.write_str("schema"),
            OutputMode::GroundingChunks => f.write_str("chunks"),
        }
    }
}
