//! Recommendation client: prompt → grounded Gemini call → normalized result.
//!
//! Every call builds its own [`GeminiService`] from the config it is handed.
//! There is no connection reuse, no retry and no cache.

use tracing::{info, instrument};

use crate::{
    api_types::{RecommendationRequest, RecommendationResult},
    config::gemini_model_config::GeminiModelConfig,
    error_handler::Result,
    normalize::{ChunkFilter, normalize},
    prompt::build_prompt,
    services::gemini_service::GeminiService,
};

/// Runs one recommendation request against the configured model.
///
/// # Errors
/// - [`RecommendError::InvalidRadius`](crate::error_handler::RecommendError::InvalidRadius)
///   before any network traffic
/// - config, transport, status, decode and empty-body errors from [`GeminiService`]
///
/// Malformed model output is not an error; it degrades to a plain-text result.
#[instrument(
    skip_all,
    fields(
        meal = %request.meal_kind,
        radius = request.radius_meters,
        located = request.coordinates.is_some(),
        grounding = %cfg.grounding,
    )
)]
pub async fn recommend(
    cfg: &GeminiModelConfig,
    request: &RecommendationRequest,
) -> Result<RecommendationResult> {
    request.validate()?;

    let prompt = build_prompt(
        request.meal_kind,
        request.radius_meters,
        request.coordinates,
        cfg.output_mode,
    );

    let service = GeminiService::new(cfg.clone())?;
    let raw = service.generate(&prompt, request.coordinates).await?;

    let result = normalize(&raw, ChunkFilter::for_tool(cfg.grounding));

    info!(
        restaurants = result.restaurants.len(),
        summary_len = result.summary_text.len(),
        "recommendation normalized"
    );

    Ok(result)
}
