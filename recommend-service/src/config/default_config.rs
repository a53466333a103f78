//! Gemini config loaded from environment variables.
//!
//! [`config_from_env`] is meant to be called once per request: the
//! recommendation client never caches a session, so whatever the environment
//! says at call time is what the next request uses.
//!
//! # Environment variables
//!
//! - `GEMINI_API_KEY` or `API_KEY`   = API key (mandatory)
//! - `GEMINI_MODEL`                  = model id (default `gemini-3-flash-preview`)
//! - `GEMINI_ENDPOINT`               = API base (default `https://generativelanguage.googleapis.com`)
//! - `GEMINI_GROUNDING`              = `search` | `maps` (default `search`)
//! - `GEMINI_OUTPUT_MODE`            = `fenced` | `schema` | `chunks` (default `fenced`)
//! - `GEMINI_TEMPERATURE`            = optional f32 in `0.0..=2.0`
//! - `GEMINI_TIMEOUT_SECS`           = optional u64 (default 60)
//! - `RECOMMEND_ALLOW_FALLBACK_AREA` = allow requests without coordinates (default `false`)

use tracing::debug;

use crate::{
    config::{
        gemini_model_config::GeminiModelConfig,
        grounding_tool::{GroundingTool, OutputMode},
    },
    error_handler::{ConfigError, Result, env_flag, env_opt, env_opt_f32, env_opt_u64},
};

/// Model used when `GEMINI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Public Gemini API base.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Request timeout used when `GEMINI_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolves the API key strictly from environment.
///
/// Precedence:
/// 1. `GEMINI_API_KEY` if present and non-empty
/// 2. `API_KEY`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
fn api_key() -> Result<String> {
    env_opt("GEMINI_API_KEY")
        .or_else(|| env_opt("API_KEY"))
        .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY or API_KEY").into())
}

/// Builds a validated [`GeminiModelConfig`] from the current environment.
///
/// # Errors
/// - [`ConfigError::MissingVar`] when no API key is set
/// - [`ConfigError::UnsupportedValue`] for unknown grounding/output modes or flags
/// - [`ConfigError::InvalidNumber`] for malformed numbers
/// - any error from [`GeminiModelConfig::validate`]
pub fn config_from_env() -> Result<GeminiModelConfig> {
    let grounding = match env_opt("GEMINI_GROUNDING") {
        Some(v) => v.parse::<GroundingTool>()?,
        None => GroundingTool::GoogleSearch,
    };
    let output_mode = match env_opt("GEMINI_OUTPUT_MODE") {
        Some(v) => v.parse::<OutputMode>()?,
        None => OutputMode::FencedJson,
    };

    let cfg = GeminiModelConfig {
        model: env_opt("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        endpoint: env_opt("GEMINI_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        api_key: api_key()?,
        grounding,
        output_mode,
        temperature: env_opt_f32("GEMINI_TEMPERATURE")?,
        timeout_secs: Some(env_opt_u64("GEMINI_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        allow_fallback_area: env_flag("RECOMMEND_ALLOW_FALLBACK_AREA", false)?,
    };
    cfg.validate()?;

    debug!(
        model = %cfg.model,
        endpoint = %cfg.endpoint,
        grounding = %cfg.grounding,
        output_mode = %cfg.output_mode,
        "gemini config loaded from env"
    );

    Ok(cfg)
}
