//! Gemini `generateContent` payload types (request body, response envelope,
//! grounding metadata).
//!
//! Response types are lenient: every field the normalizer can live without is
//! optional or defaulted, so an unexpected shape degrades instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::{
        gemini_model_config::GeminiModelConfig,
        grounding_tool::{GroundingTool, OutputMode},
    },
    location::Coordinates,
};

/* ===========================================================================
Request
======================================================================== */

/// Request body for `POST /v1beta/models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl<'a> GenerateContentRequest<'a> {
    /// Builds a single-turn request with exactly one grounding tool.
    ///
    /// Coordinates only bias maps grounding; search grounding has no location knob.
    pub(crate) fn from_cfg(
        cfg: &GeminiModelConfig,
        prompt: &'a str,
        coords: Option<Coordinates>,
    ) -> Self {
        let tools = vec![match cfg.grounding {
            GroundingTool::GoogleSearch => Tool::GoogleSearch {},
            GroundingTool::GoogleMaps => Tool::GoogleMaps {},
        }];

        let tool_config = match (cfg.grounding, coords) {
            (GroundingTool::GoogleMaps, Some(c)) => Some(ToolConfig {
                retrieval_config: RetrievalConfig {
                    lat_lng: LatLng {
                        latitude: c.latitude,
                        longitude: c.longitude,
                    },
                },
            }),
            _ => None,
        };

        let schema_mode = cfg.output_mode == OutputMode::SchemaJson;
        let generation_config = if schema_mode || cfg.temperature.is_some() {
            Some(GenerationConfig {
                temperature: cfg.temperature,
                response_mime_type: schema_mode.then_some("application/json"),
                response_schema: schema_mode.then(recommendation_schema),
            })
        } else {
            None
        };

        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            tools,
            tool_config,
            generation_config,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Serializes as `{"googleSearch":{}}` / `{"googleMaps":{}}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Tool {
    GoogleSearch {},
    GoogleMaps {},
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    retrieval_config: RetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfig {
    lat_lng: LatLng,
}

#[derive(Debug, Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

/// OpenAPI-subset schema mirroring `{ summary, restaurants[] }`.
fn recommendation_schema() -> Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "restaurants": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "uri": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "rating": { "type": "NUMBER" }
                    },
                    "required": ["title"]
                }
            }
        },
        "required": ["summary", "restaurants"]
    })
}

/* ===========================================================================
Response
======================================================================== */

/// Top-level `generateContent` response envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Candidate completion item returned by Gemini.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
    /// Thinking-model summaries; never part of the answer.
    #[serde(default)]
    pub thought: Option<bool>,
}

impl Candidate {
    /// Concatenates the answer text parts, skipping thought parts.
    pub(crate) fn text(&self) -> String {
        self.content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Grounding metadata attached to a candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// One retrieved source; at most one of `web` / `maps` is normally set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<MapsChunk>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebChunk {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

/// Place returned by maps grounding.
///
/// Review snippets are accepted both flat (`reviewSnippets`) and nested under
/// `placeAnswerSources`, which is where the public API puts them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsChunk {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub review_snippets: Vec<ReviewSnippet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_answer_sources: Option<PlaceAnswerSources>,
}

impl MapsChunk {
    /// Non-empty review texts in source order.
    pub fn reviews(&self) -> Vec<String> {
        self.review_snippets
            .iter()
            .chain(
                self.place_answer_sources
                    .iter()
                    .flat_map(|s| s.review_snippets.iter()),
            )
            .filter_map(ReviewSnippet::text)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnswerSources {
    #[serde(default)]
    pub review_snippets: Vec<ReviewSnippet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSnippet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ReviewSnippet {
    fn text(&self) -> Option<String> {
        self.review
            .as_deref()
            .or(self.title.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(grounding: GroundingTool, output_mode: OutputMode) -> GeminiModelConfig {
        GeminiModelConfig {
            model: "gemini-test".into(),
            endpoint: "http://localhost".into(),
            api_key: "k".into(),
            grounding,
            output_mode,
            temperature: None,
            timeout_secs: None,
            allow_fallback_area: false,
        }
    }

    const SEOUL: Coordinates = Coordinates {
        latitude: 37.5,
        longitude: 127.0,
    };

    #[test]
    fn search_request_has_single_tool_and_no_bias() {
        let c = cfg(GroundingTool::GoogleSearch, OutputMode::FencedJson);
        let v = serde_json::to_value(GenerateContentRequest::from_cfg(&c, "hi", Some(SEOUL)))
            .unwrap();
        assert_eq!(v["tools"], serde_json::json!([{ "googleSearch": {} }]));
        assert!(v.get("toolConfig").is_none());
        assert!(v.get("generationConfig").is_none());
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn maps_request_is_biased_and_schema_mode_sets_mime() {
        let c = cfg(GroundingTool::GoogleMaps, OutputMode::SchemaJson);
        let v = serde_json::to_value(GenerateContentRequest::from_cfg(&c, "hi", Some(SEOUL)))
            .unwrap();
        assert_eq!(v["tools"], serde_json::json!([{ "googleMaps": {} }]));
        assert_eq!(v["toolConfig"]["retrievalConfig"]["latLng"]["latitude"], 37.5);
        assert_eq!(
            v["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(v["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn response_text_skips_thoughts() {
        let raw = r#"{"candidates":[{"content":{"parts":[
            {"text":"thinking...","thought":true},
            {"text":"Hello "},{"text":"world"}]}}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.candidates[0].text(), "Hello world");
    }

    #[test]
    fn maps_reviews_from_both_locations() {
        let raw = r#"{"title":"A식당","uri":"u1",
            "reviewSnippets":[{"review":"맛있어요"}],
            "placeAnswerSources":{"reviewSnippets":[{"title":"친절해요"},{"review":"  "}]}}"#;
        let m: MapsChunk = serde_json::from_str(raw).unwrap();
        assert_eq!(m.reviews(), vec!["맛있어요".to_string(), "친절해요".to_string()]);
    }
}
