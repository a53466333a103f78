//! Gemini service for grounded text generation.
//!
//! Minimal, non-streaming client around the Gemini REST API. The endpoint is
//! derived from `GeminiModelConfig::endpoint`:
//! - POST {endpoint}/v1beta/models/{model}:generateContent
//!
//! Constructor validation:
//! - `cfg.model` must be non-empty
//! - `cfg.endpoint` must start with http:// or https://
//! - `cfg.api_key` must be a valid header value
//!
//! A service owns one `reqwest::Client` and is meant to live for exactly one
//! request; callers build a new one per call.

use std::time::{Duration, Instant};

use reqwest::header;
use tracing::{debug, error, info, warn};

use crate::{
    config::{gemini_model_config::GeminiModelConfig, grounding_tool::OutputMode},
    error_handler::{EndpointError, HttpError, RecommendError, Result, make_snippet},
    location::Coordinates,
    normalize::RawResponse,
    services::gemini_types::{GenerateContentRequest, GenerateContentResponse},
};

/// Default timeout when the config does not set one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Thin client for the Gemini `generateContent` API.
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: GeminiModelConfig,
    url_generate: String,
    timeout: Duration,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] from the given config.
    ///
    /// # Errors
    /// - [`RecommendError::Config`] if the config does not validate
    /// - [`EndpointError::InvalidApiKey`] if the key cannot be used as a header
    /// - [`RecommendError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: GeminiModelConfig) -> Result<Self> {
        cfg.validate()?;

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let mut headers = header::HeaderMap::new();
        let mut key = header::HeaderValue::from_str(cfg.api_key.trim())
            .map_err(|_| EndpointError::InvalidApiKey)?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = cfg.endpoint.trim().trim_end_matches('/');
        let url_generate = format!("{base}/v1beta/models/{}:generateContent", cfg.model.trim());

        debug!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            grounding = %cfg.grounding,
            timeout_secs = timeout.as_secs(),
            "GeminiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_generate,
            timeout,
        })
    }

    /// Performs a single grounded `generateContent` call.
    ///
    /// `coords` biases maps grounding; it is ignored for search grounding.
    ///
    /// # Errors
    /// - [`RecommendError::Timeout`] when the configured timeout elapses
    /// - [`RecommendError::HttpTransport`] for other client/network failures
    /// - [`EndpointError::HttpStatus`] for non-2xx responses
    /// - [`EndpointError::Decode`] if the envelope cannot be parsed
    /// - [`RecommendError::EmptyResponse`] if there is no candidate, or neither
    ///   text nor grounding chunks
    pub async fn generate(&self, prompt: &str, coords: Option<Coordinates>) -> Result<RawResponse> {
        let started = Instant::now();
        let body = GenerateContentRequest::from_cfg(&self.cfg, prompt, coords);

        debug!(
            model = %self.cfg.model,
            grounding = %self.cfg.grounding,
            output_mode = %self.cfg.output_mode,
            prompt_len = prompt.len(),
            biased = coords.is_some(),
            "POST {}", self.url_generate
        );

        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_generate.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "generateContent returned non-success status"
            );

            return Err(EndpointError::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })
            .into());
        }

        let bytes = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            warn!(model = %self.cfg.model, "generateContent returned an empty body");
            return Err(RecommendError::EmptyResponse);
        }

        let out: GenerateContentResponse = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode generateContent response"
                );
                return Err(EndpointError::Decode(format!(
                    "serde error: {e}; expected `candidates[0].content.parts`"
                ))
                .into());
            }
        };

        let raw = self.flatten_candidate(out)?;

        info!(
            model = %self.cfg.model,
            text_len = raw.text.len(),
            chunks = raw.chunks.len(),
            structured = raw.structured.is_some(),
            latency_ms = started.elapsed().as_millis(),
            "generateContent completed"
        );

        Ok(raw)
    }

    /// Picks the first candidate and flattens it into a [`RawResponse`].
    fn flatten_candidate(&self, out: GenerateContentResponse) -> Result<RawResponse> {
        let candidate = out
            .candidates
            .into_iter()
            .next()
            .ok_or(RecommendError::EmptyResponse)?;

        let text = candidate.text();
        let chunks = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default();

        if text.trim().is_empty() && chunks.is_empty() {
            warn!(
                model = %self.cfg.model,
                finish_reason = candidate.finish_reason.as_deref().unwrap_or("-"),
                "candidate has neither text nor grounding chunks"
            );
            return Err(RecommendError::EmptyResponse);
        }

        let structured = match self.cfg.output_mode {
            OutputMode::SchemaJson => serde_json::from_str::<serde_json::Value>(text.trim())
                .map_err(|e| warn!(error = %e, "schema-mode text is not valid JSON"))
                .ok(),
            _ => None,
        };

        Ok(RawResponse {
            text,
            structured,
            chunks,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> RecommendError {
        if e.is_timeout() {
            error!(model = %self.cfg.model, timeout = ?self.timeout, "generateContent timed out");
            RecommendError::Timeout(self.timeout)
        } else {
            error!(error = %e, model = %self.cfg.model, "generateContent transport failure");
            RecommendError::HttpTransport(e)
        }
    }
}
