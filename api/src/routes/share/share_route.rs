//! GET /share: payload for the native share sheet or the clipboard fallback.

use axum::{extract::Query, http::StatusCode, response::Response};
use serde::{Deserialize, Serialize};

use crate::{
    core::http::response_envelope::ApiResponse,
    error_handler::{AppError, AppResult},
};

pub const SHARE_TITLE: &str = "맛점맛저 - 오늘 뭐 먹지?";
pub const SHARE_TEXT: &str = "직장인들을 위한 AI 기반 메뉴 추천 서비스!";
pub const CLIPBOARD_NOTICE: &str = "링크가 클립보드에 복사되었습니다!";

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    /// Address of the page being shared.
    pub url: String,
}

/// Fixed share content plus the caller's page URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub title: &'static str,
    pub text: &'static str,
    pub url: String,
    /// Shown when the page falls back to copying `url`.
    pub clipboard_notice: &'static str,
}

/// Handler: GET /share?url=<page url>
pub async fn share_route(Query(q): Query<ShareQuery>) -> AppResult<Response> {
    let url = q.url.trim();
    if url.is_empty() {
        return Err(AppError::BadRequest("`url` must not be empty".into()));
    }

    let payload = SharePayload {
        title: SHARE_TITLE,
        text: SHARE_TEXT,
        url: url.to_string(),
        clipboard_notice: CLIPBOARD_NOTICE,
    };
    Ok(ApiResponse::success(payload).into_response_with_status(StatusCode::OK))
}
