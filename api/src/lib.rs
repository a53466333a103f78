use std::{env, sync::Arc};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use recommend_service::config_from_env;
use tokio::signal;
use tracing::{error, info, warn};

pub use crate::{
    core::app_state::{AppState, ConfigSource},
    error_handler::AppError,
};
use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        health::health_route::health_route, recommend::recommend_route::recommend_route,
        share::share_route::share_route,
    },
};

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";

/// All routes with the JSON error envelope applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/recommendations", post(recommend_route))
        .route("/share", get(share_route))
        .route("/health", get(health_route))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Serves the API on `API_ADDRESS` until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());

    match config_from_env() {
        Ok(cfg) => info!(
            model = %cfg.model,
            grounding = %cfg.grounding,
            output_mode = %cfg.output_mode,
            "gemini config ok"
        ),
        Err(e) => warn!(error = %e, "gemini config incomplete; recommendations will fail until fixed"),
    }

    let app = router(Arc::new(AppState::from_env()));

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("api stopped");
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed the server runs
/// until killed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::{Json, extract::State, http::StatusCode};
    use recommend_service::{GeminiModelConfig, GroundingTool, OutputMode, prompt::FALLBACK_AREA};
    use serde_json::{Value, json};

    use super::*;
    use crate::error_handler::{
        MSG_ENDPOINT_FAILURE, MSG_LOCATION_DENIED, MSG_LOCATION_UNAVAILABLE,
    };

    #[derive(Clone)]
    struct Upstream {
        status: StatusCode,
        reply: Arc<Value>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    async fn generate_content(
        State(up): State<Upstream>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let prompt = body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        up.prompts.lock().unwrap().push(prompt);
        (up.status, Json((*up.reply).clone()))
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    struct Harness {
        base: String,
        state: Arc<AppState>,
        upstream: Upstream,
        http: reqwest::Client,
    }

    async fn harness(status: StatusCode, reply: Value, allow_fallback_area: bool) -> Harness {
        let upstream = Upstream {
            status,
            reply: Arc::new(reply),
            prompts: Arc::new(Mutex::new(Vec::new())),
        };
        let gemini = serve(
            Router::new()
                .route("/v1beta/models/{call}", post(generate_content))
                .with_state(upstream.clone()),
        )
        .await;

        let cfg = GeminiModelConfig {
            model: "gemini-test".into(),
            endpoint: gemini,
            api_key: "test-key".into(),
            grounding: GroundingTool::GoogleSearch,
            output_mode: OutputMode::FencedJson,
            temperature: None,
            timeout_secs: Some(5),
            allow_fallback_area,
        };
        let state = Arc::new(AppState::new(ConfigSource::Fixed(cfg)));
        let base = serve(router(state.clone())).await;

        Harness {
            base,
            state,
            upstream,
            http: reqwest::Client::new(),
        }
    }

    impl Harness {
        async fn post(&self, body: Value) -> (reqwest::StatusCode, Value) {
            let res = self
                .http
                .post(format!("{}/recommendations", self.base))
                .json(&body)
                .send()
                .await
                .unwrap();
            (res.status(), res.json().await.unwrap())
        }
    }

    fn fenced_reply() -> Value {
        let text = "점심 추천입니다.\n```json\n{\"summary\":\"근처 점심 두 곳\",\"restaurants\":[\
            {\"title\":\"광화문 국밥\",\"rating\":4.3},{\"title\":\"청진동 칼국수\",\"uri\":\"https://example.com/k\"}]}\n```";
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    fn granted_body(radius: u32) -> Value {
        json!({
            "mealKind": "LUNCH",
            "radiusMeters": radius,
            "location": { "status": "granted", "latitude": 37.5, "longitude": 127.0 }
        })
    }

    #[tokio::test]
    async fn serves_recommendations() {
        let h = harness(StatusCode::OK, fenced_reply(), false).await;

        let (status, v) = h.post(granted_body(500)).await;

        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(v["success"], true);
        assert_eq!(v["data"]["text"], "근처 점심 두 곳");
        let restaurants = v["data"]["restaurants"].as_array().unwrap();
        assert_eq!(restaurants.len(), 2);
        assert_eq!(restaurants[0]["title"], "광화문 국밥");
        assert!(
            restaurants[0]["uri"]
                .as_str()
                .unwrap()
                .starts_with("https://map.naver.com/v5/search/")
        );
        assert_eq!(restaurants[1]["uri"], "https://example.com/k");

        let prompts = h.upstream.prompts.lock().unwrap();
        assert!(prompts[0].contains("500"));
        assert!(prompts[0].contains("37.5"));
    }

    #[tokio::test]
    async fn denied_location_is_forbidden() {
        let h = harness(StatusCode::OK, fenced_reply(), true).await;

        let (status, v) = h
            .post(json!({ "mealKind": "DINNER", "radiusMeters": 300, "location": { "status": "denied" } }))
            .await;

        assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
        assert_eq!(v["error"]["code"], "LOCATION_DENIED");
        assert_eq!(v["error"]["message"], MSG_LOCATION_DENIED);
        assert!(h.upstream.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_location_is_blocked_without_fallback() {
        let h = harness(StatusCode::OK, fenced_reply(), false).await;

        let (status, v) = h
            .post(json!({ "mealKind": "LUNCH", "radiusMeters": 500, "location": { "status": "pending" } }))
            .await;

        assert_eq!(status, reqwest::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "LOCATION_UNAVAILABLE");
        assert_eq!(v["error"]["message"], MSG_LOCATION_UNAVAILABLE);
    }

    #[tokio::test]
    async fn pending_location_uses_fallback_area_when_allowed() {
        let h = harness(StatusCode::OK, fenced_reply(), true).await;

        let (status, _) = h
            .post(json!({ "mealKind": "LUNCH", "radiusMeters": 500, "location": { "status": "unsupported" } }))
            .await;

        assert_eq!(status, reqwest::StatusCode::OK);
        assert!(h.upstream.prompts.lock().unwrap()[0].contains(FALLBACK_AREA));
    }

    #[tokio::test]
    async fn out_of_range_radius_is_rejected() {
        let h = harness(StatusCode::OK, fenced_reply(), false).await;

        let (status, v) = h.post(granted_body(50)).await;

        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(v["error"]["code"], "INVALID_RADIUS");
        assert_eq!(v["error"]["details"][0]["path"], "radiusMeters");
    }

    #[tokio::test]
    async fn second_submission_while_busy_conflicts() {
        let h = harness(StatusCode::OK, fenced_reply(), false).await;
        let held = h.state.try_acquire();
        assert!(held.is_some());

        let (status, v) = h.post(granted_body(500)).await;
        assert_eq!(status, reqwest::StatusCode::CONFLICT);
        assert_eq!(v["error"]["code"], "REQUEST_IN_FLIGHT");

        drop(held);
        let (status, _) = h.post(granted_body(500)).await;
        assert_eq!(status, reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway_with_generic_message() {
        let h = harness(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": { "message": "quota exhausted" } }),
            false,
        )
        .await;

        let (status, v) = h.post(granted_body(500)).await;

        assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(v["error"]["code"], "ENDPOINT_FAILURE");
        assert_eq!(v["error"]["message"], MSG_ENDPOINT_FAILURE);
        assert!(!v.to_string().contains("quota"));
    }

    #[tokio::test]
    async fn malformed_body_gets_envelope() {
        let h = harness(StatusCode::OK, fenced_reply(), false).await;

        let (status, v) = h
            .post(json!({ "mealKind": "BRUNCH", "radiusMeters": 500 }))
            .await;

        assert_eq!(status, reqwest::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "UNPROCESSABLE_ENTITY");
        assert_eq!(v["error"]["details"][0]["path"], "mealKind");
    }

    #[tokio::test]
    async fn share_returns_fixed_payload() {
        let h = harness(StatusCode::OK, fenced_reply(), false).await;

        let v: Value = h
            .http
            .get(format!("{}/share", h.base))
            .query(&[("url", "https://matjeom.example/")])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(v["data"]["title"], "맛점맛저 - 오늘 뭐 먹지?");
        assert_eq!(v["data"]["url"], "https://matjeom.example/");
        assert_eq!(v["data"]["clipboardNotice"], "링크가 클립보드에 복사되었습니다!");

        let res = h.http.get(format!("{}/share", h.base)).send().await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
        let v: Value = res.json().await.unwrap();
        assert_eq!(v["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let h = harness(StatusCode::OK, fenced_reply(), false).await;

        let res = h
            .http
            .get(format!("{}/share", h.base))
            .header("X-Request-Id", "abc-123")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(res.headers()["x-request-id"], "abc-123");
        let v: Value = res.json().await.unwrap();
        assert_eq!(v["error"]["requestId"], "abc-123");

        let res = h.http.get(format!("{}/health", h.base)).send().await.unwrap();
        let id = res.headers()["x-request-id"].to_str().unwrap();
        assert!(id.starts_with("req-"));
    }

    #[tokio::test]
    async fn health_reports_model() {
        let h = harness(StatusCode::OK, fenced_reply(), false).await;

        let v: Value = h
            .http
            .get(format!("{}/health", h.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(v["data"]["status"], "ok");
        assert_eq!(v["data"]["model"], "gemini-test");
        assert_eq!(v["data"]["grounding"], "search");
        assert_eq!(v["data"]["outputMode"], "fenced");
    }
}
