//! Prompt builder: meal focus, radius, location context and answer format.

use crate::{
    api_types::MealKind,
    config::grounding_tool::OutputMode,
    location::Coordinates,
    normalize::link::MAP_SEARCH_BASE,
};

/// Number of restaurants the model is asked for.
pub const RESULT_COUNT: usize = 5;

/// Area named in the prompt when no coordinates are available.
pub const FALLBACK_AREA: &str = "서울 도심 주요 지역";

/// Builds the user prompt for one recommendation request.
///
/// Pure function of its inputs. The radius and, when present, both coordinate
/// values appear verbatim in the output.
///
/// # Example
/// ```
/// # use recommend_service::prompt::build_prompt;
/// # use recommend_service::api_types::MealKind;
/// # use recommend_service::config::grounding_tool::OutputMode;
/// let p = build_prompt(MealKind::Lunch, 500, None, OutputMode::FencedJson);
/// assert!(p.contains("500m"));
/// assert!(p.contains("서울 도심 주요 지역"));
/// ```
pub fn build_prompt(
    meal: MealKind,
    radius_meters: u32,
    coords: Option<Coordinates>,
    mode: OutputMode,
) -> String {
    let location = match coords {
        Some(c) => format!("현재 위치(위도 {}, 경도 {})", c.latitude, c.longitude),
        None => FALLBACK_AREA.to_string(),
    };

    let mut out = String::new();
    out.push_str("당신은 대한민국 최고의 맛집 가이드입니다.\n");
    out.push_str(&format!(
        "{location} 주변 반경 {radius_meters}m 내에서 {} 식당 {RESULT_COUNT}곳을 추천하세요.\n",
        meal.label()
    ));
    out.push_str(meal_focus(meal));
    out.push_str("\n\n지침:\n");
    out.push_str("1. 반드시 검색/지도 도구로 확인된, 현재 실제로 영업 중인 식당만 추천하세요.\n");
    out.push_str(&format!(
        "2. 반경 {radius_meters}m를 벗어나는 식당은 제외하세요.\n"
    ));
    out.push_str("3. 검색 결과에서 찾은 평점(예: 4.3)이 있다면 포함하세요.\n");
    out.push_str(&format!(
        "4. 링크는 '{MAP_SEARCH_BASE}식당이름' 형식의 네이버 지도 검색 URL로 작성하세요.\n"
    ));
    out.push_str(output_instructions(mode));
    out
}

fn meal_focus(meal: MealKind) -> &'static str {
    match meal {
        MealKind::Lunch => {
            "직장인의 점심시간에 맞게 빠르게 나오고 가격 부담이 적은 곳을 우선하세요."
        }
        MealKind::Dinner => {
            "동료나 친구와 함께 모이기 좋고 든든하게 먹을 수 있는 분위기 있는 곳을 우선하세요."
        }
    }
}

fn output_instructions(mode: OutputMode) -> &'static str {
    match mode {
        OutputMode::FencedJson => {
            r#"5. 응답 마지막에 아래 형식의 JSON을 ```json ... ``` 블록으로 감싸서 반드시 포함하세요.

{
  "summary": "직장인들을 위한 한글 추천 문구",
  "restaurants": [
    { "title": "식당이름", "uri": "네이버 지도 검색 URL", "description": "한 줄 특징", "rating": 4.5 }
  ]
}
"#
        }
        OutputMode::SchemaJson => {
            "5. 주어진 스키마에 맞는 JSON 객체 하나만 응답하세요. summary에는 한글 추천 문구를, restaurants에는 title, uri, description, rating을 채우세요.\n"
        }
        OutputMode::GroundingChunks => {
            "5. 각 식당의 이름과 한 줄 특징을 자연스러운 한국어 문단으로 정리하세요. JSON은 필요하지 않습니다.\n"
        }
    }
}
