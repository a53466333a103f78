//! Lunch/dinner restaurant recommendations grounded by Gemini search or maps.
//!
//! The flow is linear and single-shot: a [`RecommendationRequest`] is turned
//! into a prompt, sent once to `generateContent` with one grounding tool, and
//! whatever comes back is normalized into a [`RecommendationResult`].

pub mod api_types;
pub mod config;
pub mod error_handler;
pub mod location;
pub mod normalize;
pub mod prompt;
pub mod recommend;
pub mod services;
pub mod telemetry;

pub use api_types::{
    MAX_RADIUS_M, MIN_RADIUS_M, MealKind, RecommendationRequest, RecommendationResult,
    RestaurantRecord,
};
pub use config::{
    default_config::config_from_env,
    gemini_model_config::GeminiModelConfig,
    grounding_tool::{GroundingTool, OutputMode},
};
pub use error_handler::{RecommendError, Result};
pub use location::{Coordinates, LocationStatus, PermissionState};
pub use recommend::recommend;
