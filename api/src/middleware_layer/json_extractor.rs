use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

/// Request field named in an extractor rejection, if any.
fn guess_path(msg: &str) -> Option<String> {
    ["mealKind", "radiusMeters", "location", "latitude", "longitude", "url"]
        .into_iter()
        .find(|key| msg.contains(key))
        .map(str::to_string)
}

fn hint_for(msg: &str, path: Option<&str>) -> Option<String> {
    match path {
        Some("mealKind") => Some("Expected \"LUNCH\" or \"DINNER\".".into()),
        Some("radiusMeters") => Some("Expected an integer number of meters (100..=2000).".into()),
        Some("location") => Some(
            "Expected { \"status\": \"granted\", \"latitude\": 37.5, \"longitude\": 127.0 }."
                .into(),
        ),
        Some("url") => Some("Pass the page address as ?url=...".into()),
        _ if msg.contains("expected struct") || msg.contains("expected a map") => {
            Some("Expected a JSON object here (e.g. { \"field\": \"value\" }).".into())
        }
        _ => None,
    }
}

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client-supplied `X-Request-Id`, or a fresh `req-<nanos>` id.
fn request_id_of(req: &Request<Body>) -> String {
    if let Some(v) = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return v.to_string();
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    format!("req-{nanos}")
}

fn echo_request_id(headers: &mut HeaderMap, id: &str) {
    if let Ok(v) = HeaderValue::from_str(id) {
        headers.insert(REQUEST_ID_HEADER, v);
    }
}

/// Echoes the request id on every response and wraps plain-text extractor
/// rejections (400/422) in the [`ApiResponse`] envelope.
///
/// Responses that are already JSON keep their body.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let request_id = request_id_of(&req);
    let mut res = next.run(req).await;
    echo_request_id(res.headers_mut(), &request_id);
    let status = res.status();

    if !(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY) {
        return res;
    }
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);
    tracing::debug!(%request_id, %status, rejection = %original.trim(), "mapped extractor rejection");

    let path = guess_path(&original);
    let detail = ApiErrorDetail {
        hint: hint_for(&original, path.as_deref()),
        path,
    };

    let envelope = ApiResponse::<()>::error(
        if status == StatusCode::BAD_REQUEST {
            "BAD_REQUEST"
        } else {
            "UNPROCESSABLE_ENTITY"
        },
        original.trim(),
        vec![detail],
    )
    .with_request_id(request_id);

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}
