use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use recommend_service::{RecommendError, error_handler::LocationError};
use thiserror::Error;
use tracing::{error, warn};

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

pub const MSG_LOCATION_UNAVAILABLE: &str =
    "현재 위치를 확인 중이거나 권한이 없습니다. 잠시만 기다려주세요.";
pub const MSG_LOCATION_DENIED: &str =
    "위치 정보 접근 권한이 필요합니다. 브라우저 설정에서 위치 권한을 허용해주세요.";
pub const MSG_ENDPOINT_FAILURE: &str =
    "AI 추천을 가져오는 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";
pub const MSG_REQUEST_IN_FLIGHT: &str = "이미 추천을 불러오는 중입니다. 잠시만 기다려주세요.";

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Another recommendation is still running.
    #[error("a recommendation request is already in flight")]
    Busy,

    #[error(transparent)]
    Recommend(#[from] RecommendError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Busy => StatusCode::CONFLICT,
            AppError::Recommend(e) => match e {
                RecommendError::Location(LocationError::Unavailable) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                RecommendError::Location(LocationError::Denied) => StatusCode::FORBIDDEN,
                RecommendError::InvalidRadius { .. } => StatusCode::BAD_REQUEST,
                e if e.is_endpoint_failure() => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Busy => "REQUEST_IN_FLIGHT",
            AppError::Recommend(e) => match e {
                RecommendError::Location(LocationError::Unavailable) => "LOCATION_UNAVAILABLE",
                RecommendError::Location(LocationError::Denied) => "LOCATION_DENIED",
                RecommendError::InvalidRadius { .. } => "INVALID_RADIUS",
                RecommendError::Config(_) => "CONFIG_ERROR",
                e if e.is_endpoint_failure() => "ENDPOINT_FAILURE",
                _ => "INTERNAL_ERROR",
            },
        }
    }

    /// Text for the user; endpoint causes stay in the logs.
    fn user_message(&self) -> String {
        match self {
            AppError::Busy => MSG_REQUEST_IN_FLIGHT.to_string(),
            AppError::Recommend(RecommendError::Location(LocationError::Unavailable)) => {
                MSG_LOCATION_UNAVAILABLE.to_string()
            }
            AppError::Recommend(RecommendError::Location(LocationError::Denied)) => {
                MSG_LOCATION_DENIED.to_string()
            }
            AppError::Recommend(RecommendError::InvalidRadius { min, max, .. }) => {
                format!("검색 반경은 {min}m에서 {max}m 사이로 선택해주세요.")
            }
            AppError::Recommend(e) if e.is_endpoint_failure() => MSG_ENDPOINT_FAILURE.to_string(),
            other => other.to_string(),
        }
    }

    fn details(&self) -> Vec<ApiErrorDetail> {
        match self {
            AppError::Recommend(RecommendError::InvalidRadius { got, min, max }) => {
                vec![ApiErrorDetail::new(
                    "radiusMeters",
                    format!("got {got}; expected {min}..={max} meters"),
                )]
            }
            AppError::Recommend(RecommendError::Location(_)) => {
                vec![ApiErrorDetail::new(
                    "location.status",
                    "send `granted` together with latitude/longitude",
                )]
            }
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            error!(%status, code, error = %self, "request failed");
        } else {
            warn!(%status, code, error = %self, "request rejected");
        }

        ApiResponse::<()>::error(code, self.user_message(), self.details())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn maps_recommend_errors_to_codes() {
        let cases = [
            (
                AppError::from(RecommendError::Location(LocationError::Unavailable)),
                StatusCode::UNPROCESSABLE_ENTITY,
                "LOCATION_UNAVAILABLE",
            ),
            (
                AppError::from(RecommendError::Location(LocationError::Denied)),
                StatusCode::FORBIDDEN,
                "LOCATION_DENIED",
            ),
            (
                AppError::from(RecommendError::InvalidRadius {
                    got: 50,
                    min: 100,
                    max: 2000,
                }),
                StatusCode::BAD_REQUEST,
                "INVALID_RADIUS",
            ),
            (
                AppError::from(RecommendError::EmptyResponse),
                StatusCode::BAD_GATEWAY,
                "ENDPOINT_FAILURE",
            ),
            (
                AppError::from(RecommendError::Timeout(Duration::from_secs(1))),
                StatusCode::BAD_GATEWAY,
                "ENDPOINT_FAILURE",
            ),
            (AppError::Busy, StatusCode::CONFLICT, "REQUEST_IN_FLIGHT"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status, "{err}");
            assert_eq!(err.error_code(), code, "{err}");
        }
    }

    #[test]
    fn radius_hint_names_the_accepted_range() {
        let err = AppError::from(RecommendError::InvalidRadius {
            got: 50,
            min: 100,
            max: 2000,
        });
        let details = err.details();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].path.as_deref(), Some("radiusMeters"));
        assert_eq!(
            details[0].hint.as_deref(),
            Some("got 50; expected 100..=2000 meters")
        );
    }

    #[test]
    fn endpoint_cause_is_not_shown_to_user() {
        let err = AppError::from(RecommendError::EmptyResponse);
        assert_eq!(err.user_message(), MSG_ENDPOINT_FAILURE);
    }
}
