//! POST /recommendations: nearby lunch/dinner picks for the current location.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use recommend_service::{RecommendError, RecommendationRequest, recommend};
use tracing::{debug, info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::recommend::recommend_request::RecommendBody,
};

/// Handler: POST /recommendations
///
/// Only one recommendation runs at a time; a second submission while the
/// first is outstanding gets `409 REQUEST_IN_FLIGHT`.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/recommendations \
///   -H 'content-type: application/json' \
///   -d '{"mealKind":"LUNCH","radiusMeters":500,
///        "location":{"status":"granted","latitude":37.5665,"longitude":126.978}}'
/// ```
#[instrument(
    name = "recommend_route",
    skip(state, headers, body),
    fields(meal = %body.meal_kind, radius = body.radius_meters)
)]
pub async fn recommend_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<RecommendBody>,
) -> AppResult<Response> {
    if let Some(id) = headers.get("X-Request-Id").and_then(|h| h.to_str().ok()) {
        debug!(%id, "request id attached");
    }

    let _gate = state.try_acquire().ok_or(AppError::Busy)?;

    let cfg = state.gemini_config()?;
    let coordinates = body
        .location_or_pending()
        .resolve(cfg.allow_fallback_area)
        .map_err(RecommendError::from)?;
    let request = RecommendationRequest::new(body.meal_kind, body.radius_meters, coordinates)?;

    let result = recommend(&cfg, &request).await?;

    info!(
        restaurants = result.restaurants.len(),
        fallback_area = coordinates.is_none(),
        "recommendation served"
    );

    Ok(ApiResponse::success(result).into_response_with_status(StatusCode::OK))
}
