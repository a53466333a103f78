use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub grounding: String,
    pub output_mode: String,
}

/// Handler: GET /health
///
/// Fails with `CONFIG_ERROR` while the Gemini config is incomplete, so a
/// missing key shows up before the first user request does.
pub async fn health_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let cfg = state.gemini_config()?;
    let body = HealthResponse {
        status: "ok",
        model: cfg.model,
        grounding: cfg.grounding.to_string(),
        output_mode: cfg.output_mode.to_string(),
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
