//! Response normalizer: turns whatever the model returned into a
//! [`RecommendationResult`], never failing.
//!
//! The raw response is first classified into an [`Extraction`] in priority order:
//!
//! 1. a structured JSON payload (schema mode) → [`Extraction::SchemaJson`]
//! 2. a fenced ```json block, or a bare `{...}` object when no fence exists
//!    → [`Extraction::FencedJson`]
//! 3. grounding chunks accepted by the [`ChunkFilter`] → [`Extraction::GroundingChunks`]
//! 4. anything else → [`Extraction::PlainText`]
//!
//! A payload only counts when it carries `summary` or `restaurants`; any
//! other object is treated like malformed JSON. A fenced block that is
//! unusable is not retried as a bare object. An unusable span is cut out of
//! the text before the summary is taken from it.

pub mod extract;
pub mod link;

use std::ops::Range;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    api_types::{RecommendationResult, RestaurantRecord},
    config::grounding_tool::GroundingTool,
    services::gemini_types::GroundingChunk,
};

use extract::{JsonSpan, bare_json_object, fenced_json_block, plain_summary, summary_outside};
use link::link_or_synthesized;

/// Summary used when the payload has none.
pub const DEFAULT_SUMMARY: &str = "선택하신 지역의 맛집 추천 결과입니다.";

/// Title used when a record has none.
pub const UNNAMED_RESTAURANT: &str = "이름 없는 식당";

/// What came back from the endpoint, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    /// Concatenated answer text (may be empty).
    pub text: String,
    /// Parsed JSON body when a response schema was requested.
    pub structured: Option<Value>,
    /// Grounding chunks of the first candidate, in source order.
    pub chunks: Vec<GroundingChunk>,
}

/// Which grounding chunks may become restaurant records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFilter {
    MapsOnly,
    Any,
}

impl ChunkFilter {
    /// Maps grounding yields places, so its web chunks are ignored; search
    /// grounding only ever yields web pages.
    pub fn for_tool(tool: GroundingTool) -> Self {
        match tool {
            GroundingTool::GoogleMaps => ChunkFilter::MapsOnly,
            GroundingTool::GoogleSearch => ChunkFilter::Any,
        }
    }

    fn accepts(self, chunk: &GroundingChunk) -> bool {
        match self {
            ChunkFilter::MapsOnly => chunk.maps.is_some(),
            ChunkFilter::Any => chunk.maps.is_some() || chunk.web.is_some(),
        }
    }
}

/// `{ summary, restaurants }` as the model writes it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecommendationPayload {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub restaurants: Option<Vec<PayloadRestaurant>>,
}

/// One restaurant entry as the model writes it. `rating` stays untyped so a
/// string or `null` rating does not reject the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PayloadRestaurant {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "link", alias = "linkUri", alias = "url")]
    pub uri: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<Value>,
}

impl RecommendationPayload {
    /// True when at least one of the two known fields is present.
    pub fn is_usable(&self) -> bool {
        self.summary.is_some() || self.restaurants.is_some()
    }
}

/// Tagged result of classifying a raw response.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    SchemaJson(RecommendationPayload),
    /// Fenced block or bare object found in free text.
    FencedJson(RecommendationPayload),
    GroundingChunks {
        summary: String,
        chunks: Vec<GroundingChunk>,
    },
    PlainText(String),
}

impl Extraction {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Extraction::SchemaJson(_) => "schema_json",
            Extraction::FencedJson(_) => "fenced_json",
            Extraction::GroundingChunks { .. } => "grounding_chunks",
            Extraction::PlainText(_) => "plain_text",
        }
    }

    /// Maps the extraction into the UI-facing shape.
    pub fn into_result(self) -> RecommendationResult {
        match self {
            Extraction::SchemaJson(p) | Extraction::FencedJson(p) => from_payload(p),
            Extraction::GroundingChunks { summary, chunks } => RecommendationResult {
                summary_text: summary,
                restaurants: chunks.iter().filter_map(record_from_chunk).collect(),
            },
            Extraction::PlainText(summary_text) => RecommendationResult {
                summary_text,
                restaurants: Vec::new(),
            },
        }
    }
}

/// Classifies `raw` following the priority order described at module level.
pub fn extract(raw: &RawResponse, filter: ChunkFilter) -> Extraction {
    if let Some(v) = &raw.structured {
        match serde_json::from_value::<RecommendationPayload>(v.clone()) {
            Ok(p) if p.is_usable() => return Extraction::SchemaJson(p),
            Ok(_) => warn!("structured payload has neither summary nor restaurants"),
            Err(e) => warn!(error = %e, "structured payload does not match recommendation shape"),
        }
    }

    let summary = match scan_text(&raw.text) {
        TextJson::Payload(p) => return Extraction::FencedJson(p),
        TextJson::Unusable(span) => summary_outside(&raw.text, span),
        TextJson::Absent => plain_summary(&raw.text),
    };

    let chunks: Vec<GroundingChunk> = raw
        .chunks
        .iter()
        .filter(|c| filter.accepts(c))
        .map(|c| match filter {
            ChunkFilter::MapsOnly => GroundingChunk {
                web: None,
                ..c.clone()
            },
            ChunkFilter::Any => c.clone(),
        })
        .collect();
    if !chunks.is_empty() {
        return Extraction::GroundingChunks { summary, chunks };
    }

    Extraction::PlainText(summary)
}

/// Classifies and maps in one step.
pub fn normalize(raw: &RawResponse, filter: ChunkFilter) -> RecommendationResult {
    let extraction = extract(raw, filter);
    debug!(
        kind = extraction.kind(),
        text_len = raw.text.len(),
        chunks = raw.chunks.len(),
        "response classified"
    );
    extraction.into_result()
}

/// Outcome of looking for a JSON payload in free text.
enum TextJson {
    Payload(RecommendationPayload),
    /// Byte range of a fenced block or brace span that could not be used.
    Unusable(Range<usize>),
    Absent,
}

fn scan_text(text: &str) -> TextJson {
    if let Some(block) = fenced_json_block(text) {
        return parse_span(block, "fenced json block");
    }
    match bare_json_object(text) {
        Some(obj) => parse_span(obj, "bare json object"),
        None => TextJson::Absent,
    }
}

fn parse_span(candidate: JsonSpan<'_>, what: &'static str) -> TextJson {
    match serde_json::from_str::<RecommendationPayload>(candidate.body) {
        Ok(p) if p.is_usable() => TextJson::Payload(p),
        Ok(_) => {
            debug!(what, "json has neither summary nor restaurants; ignoring it");
            TextJson::Unusable(candidate.span)
        }
        Err(e) => {
            warn!(what, error = %e, "malformed json; using text fallback");
            TextJson::Unusable(candidate.span)
        }
    }
}

fn from_payload(p: RecommendationPayload) -> RecommendationResult {
    let summary_text = non_blank(p.summary.as_deref())
        .unwrap_or(DEFAULT_SUMMARY)
        .to_string();

    let restaurants = p
        .restaurants
        .unwrap_or_default()
        .into_iter()
        .map(|r| {
            let title = non_blank(r.title.as_deref())
                .unwrap_or(UNNAMED_RESTAURANT)
                .to_string();
            RestaurantRecord {
                link_uri: link_or_synthesized(r.uri.as_deref(), &title),
                description: non_blank(r.description.as_deref()).map(str::to_string),
                // No clamping: out-of-range ratings pass through as reported.
                rating: Some(r.rating.as_ref().and_then(Value::as_f64).unwrap_or(0.0)),
                reviews: Vec::new(),
                title,
            }
        })
        .collect();

    RecommendationResult {
        summary_text,
        restaurants,
    }
}

fn record_from_chunk(chunk: &GroundingChunk) -> Option<RestaurantRecord> {
    if let Some(m) = &chunk.maps {
        let title = non_blank(m.title.as_deref())
            .unwrap_or(UNNAMED_RESTAURANT)
            .to_string();
        let reviews = m.reviews();
        return Some(RestaurantRecord {
            link_uri: link_or_synthesized(m.uri.as_deref(), &title),
            description: reviews.first().cloned(),
            rating: None,
            reviews,
            title,
        });
    }

    let w = chunk.web.as_ref()?;
    let title = non_blank(w.title.as_deref())
        .unwrap_or(UNNAMED_RESTAURANT)
        .to_string();
    Some(RestaurantRecord {
        link_uri: link_or_synthesized(w.uri.as_deref(), &title),
        description: None,
        rating: None,
        reviews: Vec::new(),
        title,
    })
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gemini_types::{MapsChunk, WebChunk};
    use link::MAP_SEARCH_BASE;

    fn text(t: &str) -> RawResponse {
        RawResponse {
            text: t.to_string(),
            ..Default::default()
        }
    }

    fn maps(title: &str, uri: &str) -> GroundingChunk {
        GroundingChunk {
            maps: Some(MapsChunk {
                title: Some(title.into()),
                uri: Some(uri.into()),
                ..Default::default()
            }),
            web: None,
        }
    }

    fn web(title: &str, uri: &str) -> GroundingChunk {
        GroundingChunk {
            web: Some(WebChunk {
                title: Some(title.into()),
                uri: Some(uri.into()),
            }),
            maps: None,
        }
    }

    #[test]
    fn fenced_block_keeps_count_order_and_links() {
        let raw = text(
            r#"여기 추천입니다.
```json
{
  "summary": "점심 추천",
  "restaurants": [
    { "title": "첫째", "uri": "https://map.naver.com/v5/search/첫째", "rating": 4.5 },
    { "title": "둘째" },
    { "title": "셋째", "uri": "", "description": "국밥" }
  ]
}
```"#,
        );
        let ex = extract(&raw, ChunkFilter::Any);
        assert_eq!(ex.kind(), "fenced_json");
        let res = ex.into_result();
        assert_eq!(res.summary_text, "점심 추천");
        let titles: Vec<_> = res.restaurants.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["첫째", "둘째", "셋째"]);
        assert!(res.restaurants.iter().all(|r| !r.link_uri.is_empty()));
        assert_eq!(
            res.restaurants[1].link_uri,
            link::synthesize_link("둘째")
        );
        assert_eq!(res.restaurants[2].description.as_deref(), Some("국밥"));
    }

    #[test]
    fn malformed_fence_falls_back_to_preamble() {
        let res = normalize(
            &text("Some preamble. ```json {invalid``` "),
            ChunkFilter::Any,
        );
        assert!(res.restaurants.is_empty());
        assert_eq!(res.summary_text, "Some preamble.");
    }

    #[test]
    fn malformed_bare_object_keeps_only_the_prose() {
        let res = normalize(
            &text(r#"추천입니다. {"summary": "x", "restaurants": [ {bad} ]}"#),
            ChunkFilter::Any,
        );
        assert_eq!(res.summary_text, "추천입니다.");
        assert!(res.restaurants.is_empty());
    }

    #[test]
    fn wrong_shape_schema_json_does_not_leak_into_summary() {
        let raw = RawResponse {
            text: r#"{"places":["A","B"]}"#.into(),
            structured: Some(serde_json::json!({ "places": ["A", "B"] })),
            chunks: Vec::new(),
        };
        let ex = extract(&raw, ChunkFilter::Any);
        assert_eq!(ex.kind(), "plain_text");
        assert_eq!(ex.into_result().summary_text, extract::FALLBACK_SUMMARY);
    }

    #[test]
    fn unrelated_object_does_not_beat_grounding_chunks() {
        let raw = RawResponse {
            text: r#"근처 식당입니다 {"note":"ok"}"#.into(),
            structured: None,
            chunks: vec![maps("A식당", "u1")],
        };
        let ex = extract(&raw, ChunkFilter::MapsOnly);
        assert_eq!(ex.kind(), "grounding_chunks");
        let res = ex.into_result();
        assert_eq!(res.restaurants.len(), 1);
        assert_eq!(res.restaurants[0].title, "A식당");
        assert_eq!(res.summary_text, "근처 식당입니다");
    }

    #[test]
    fn unrelated_fenced_object_is_not_retried_as_bare() {
        let res = normalize(
            &text("설명 ```json\n{\"note\":1}\n``` {\"summary\":\"late\"}"),
            ChunkFilter::Any,
        );
        assert_eq!(res.summary_text, "설명");
        assert!(res.restaurants.is_empty());
    }

    #[test]
    fn search_grounding_with_only_web_chunks() {
        let raw = RawResponse {
            text: "검색 결과를 정리했습니다.".into(),
            structured: None,
            chunks: vec![web("을지로 노포", "https://example.com/a"), web("", "")],
        };
        let res = normalize(&raw, ChunkFilter::for_tool(GroundingTool::GoogleSearch));
        assert_eq!(res.summary_text, "검색 결과를 정리했습니다.");
        assert_eq!(res.restaurants.len(), 2);
        assert_eq!(res.restaurants[0].link_uri, "https://example.com/a");
        assert_eq!(res.restaurants[1].title, UNNAMED_RESTAURANT);
        assert_eq!(res.restaurants[1].link_uri, link::synthesize_link(UNNAMED_RESTAURANT));
        assert!(res.restaurants.iter().all(|r| r.rating.is_none()));
    }

    #[test]
    fn bare_object_is_found_without_fence() {
        let res = normalize(
            &text(r#"결과: {"summary":"s","restaurants":[{"title":"A"}]} 끝"#),
            ChunkFilter::Any,
        );
        assert_eq!(res.summary_text, "s");
        assert_eq!(res.restaurants.len(), 1);
    }

    #[test]
    fn rating_defaults_to_zero_and_is_not_clamped() {
        let res = normalize(
            &text(
                r#"```json
{"restaurants":[{"title":"a"},{"title":"b","rating":"4.2"},{"title":"c","rating":null},{"title":"d","rating":7.5}]}
```"#,
            ),
            ChunkFilter::Any,
        );
        let ratings: Vec<_> = res.restaurants.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, [Some(0.0), Some(0.0), Some(0.0), Some(7.5)]);
        assert_eq!(res.summary_text, DEFAULT_SUMMARY);
    }

    #[test]
    fn missing_title_gets_placeholder_and_link() {
        let res = normalize(
            &text(r#"```json
{"summary":"s","restaurants":[{"description":"x"}]}
```"#),
            ChunkFilter::Any,
        );
        assert_eq!(res.restaurants[0].title, UNNAMED_RESTAURANT);
        assert!(res.restaurants[0].link_uri.starts_with(MAP_SEARCH_BASE));
    }

    #[test]
    fn maps_only_filter_keeps_places() {
        let raw = RawResponse {
            text: "주변 식당을 찾았습니다.".into(),
            structured: None,
            chunks: vec![maps("A식당", "u1"), web("B", "u2")],
        };
        let res = normalize(&raw, ChunkFilter::MapsOnly);
        assert_eq!(res.restaurants.len(), 1);
        assert_eq!(res.restaurants[0].title, "A식당");
        assert_eq!(res.restaurants[0].link_uri, "u1");
        assert_eq!(res.restaurants[0].rating, None);
        assert_eq!(res.summary_text, "주변 식당을 찾았습니다.");
    }

    #[test]
    fn any_filter_keeps_web_and_maps_in_order() {
        let raw = RawResponse {
            text: String::new(),
            structured: None,
            chunks: vec![web("B", "u2"), GroundingChunk::default(), maps("A", "u1")],
        };
        let res = normalize(&raw, ChunkFilter::Any);
        let titles: Vec<_> = res.restaurants.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
        assert_eq!(res.summary_text, extract::FALLBACK_SUMMARY);
    }

    #[test]
    fn chunk_reviews_become_description() {
        let mut chunk = maps("A", "");
        if let Some(m) = chunk.maps.as_mut() {
            m.review_snippets = vec![crate::services::gemini_types::ReviewSnippet {
                review: Some("혼밥하기 좋아요".into()),
                title: None,
            }];
        }
        let raw = RawResponse {
            chunks: vec![chunk],
            ..Default::default()
        };
        let res = normalize(&raw, ChunkFilter::MapsOnly);
        let r = &res.restaurants[0];
        assert_eq!(r.description.as_deref(), Some("혼밥하기 좋아요"));
        assert_eq!(r.reviews.len(), 1);
        assert_eq!(r.link_uri, link::synthesize_link("A"));
    }

    #[test]
    fn structured_payload_wins_over_text() {
        let raw = RawResponse {
            text: "```json\n{\"summary\":\"from text\"}\n```".into(),
            structured: Some(serde_json::json!({
                "summary": "from schema",
                "restaurants": [{ "title": "S", "rating": 4 }]
            })),
            chunks: vec![maps("M", "u")],
        };
        let ex = extract(&raw, ChunkFilter::MapsOnly);
        assert_eq!(ex.kind(), "schema_json");
        let res = ex.into_result();
        assert_eq!(res.summary_text, "from schema");
        assert_eq!(res.restaurants[0].rating, Some(4.0));
    }

    #[test]
    fn unusable_everything_is_plain_text() {
        let res = normalize(&text("오늘은 추천이 어렵습니다."), ChunkFilter::MapsOnly);
        assert_eq!(res.summary_text, "오늘은 추천이 어렵습니다.");
        assert!(res.restaurants.is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let res = normalize(
            &text(r#"```json
{"summary":"s","restaurants":[{"title":"A"},{"title":"A"}]}
```"#),
            ChunkFilter::Any,
        );
        assert_eq!(res.restaurants.len(), 2);
    }
}
