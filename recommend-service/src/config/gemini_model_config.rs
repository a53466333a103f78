use crate::{
    config::grounding_tool::{GroundingTool, OutputMode},
    error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32},
};

/// Configuration for one Gemini `generateContent` invocation.
///
/// Passed explicitly into every call; nothing is cached between calls, so a
/// rotated key or a switched grounding tool takes effect on the next request.
///
/// # Fields
///
/// - `model`: The model identifier (e.g., `"gemini-3-flash-preview"`).
/// - `endpoint`: API base URL (e.g., `https://generativelanguage.googleapis.com`).
/// - `api_key`: Key sent as `x-goog-api-key`.
/// - `grounding`: The single grounding tool attached to the request.
/// - `output_mode`: How the answer is requested (fenced JSON, schema JSON, chunks).
/// - `temperature`: Optional sampling temperature.
/// - `timeout_secs`: Optional request timeout in seconds.
/// - `allow_fallback_area`: Whether a missing location may fall back to the named default area.
///
/// # Examples
///
/// ```
/// use recommend_service::config::gemini_model_config::GeminiModelConfig;
/// use recommend_service::config::grounding_tool::{GroundingTool, OutputMode};
///
/// let cfg = GeminiModelConfig {
///     model: "gemini-3-flash-preview".to_string(),
///     endpoint: "https://generativelanguage.googleapis.com".to_string(),
///     api_key: "AIza...".to_string(),
///     grounding: GroundingTool::GoogleSearch,
///     output_mode: OutputMode::FencedJson,
///     temperature: None,
///     timeout_secs: Some(60),
///     allow_fallback_area: false,
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiModelConfig {
    /// Model identifier string.
    pub model: String,

    /// API base URL without the `/v1beta/...` path.
    pub endpoint: String,

    /// API key for authentication.
    pub api_key: String,

    /// Grounding tool (search or maps).
    pub grounding: GroundingTool,

    /// Requested answer shape.
    pub output_mode: OutputMode,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,

    /// Use the named fallback area when no coordinates are available.
    pub allow_fallback_area: bool,
}

impl GeminiModelConfig {
    /// Checks invariants that the environment loader cannot express by type.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyModel`] if the model name is blank
    /// - [`ConfigError::InvalidFormat`] if the endpoint is not http(s)
    /// - [`ConfigError::OutOfRange`] if the temperature is outside `0.0..=2.0`
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("GEMINI_ENDPOINT", self.endpoint.trim())?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        Ok(())
    }
}
