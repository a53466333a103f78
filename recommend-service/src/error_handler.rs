//! Unified error handling for `recommend-service`.
//!
//! This module exposes a single top-level error type [`RecommendError`] for the whole
//! library, and groups domain-specific errors in nested enums (e.g., [`ConfigError`],
//! [`EndpointError`], [`LocationError`]). Small helpers for reading/validating
//! environment variables are provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[Recommend Service]` to simplify attribution in logs.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, RecommendError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `recommend-service` crate.
///
/// Malformed model output has no variant here: the normalizer downgrades it
/// to a plain-text result.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RecommendError {
    /// Configuration/validation errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The generative endpoint answered, but not with something usable.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// Device location could not be turned into request coordinates.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Search radius outside of the supported range.
    #[error("[Recommend Service] radius {got}m is out of range {min}..={max}")]
    InvalidRadius {
        /// Radius that was requested, in meters.
        got: u32,
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },

    /// The endpoint returned neither text nor grounding metadata.
    #[error("[Recommend Service] empty response from generative endpoint")]
    EmptyResponse,

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[Recommend Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Operation exceeded the configured timeout.
    #[error("[Recommend Service] operation timed out after {0:?}")]
    Timeout(Duration),
}

impl RecommendError {
    /// True for failures of the outbound model call (transport, status, decode, empty body).
    ///
    /// These are the ones surfaced to users as a generic "try again" banner.
    pub fn is_endpoint_failure(&self) -> bool {
        matches!(
            self,
            RecommendError::Endpoint(_)
                | RecommendError::EmptyResponse
                | RecommendError::HttpTransport(_)
                | RecommendError::Timeout(_)
        )
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[Recommend Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like timeouts, temperatures).
    #[error("[Recommend Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `GEMINI_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Unsupported value for an enumerated setting.
    #[error("[Recommend Service] unsupported value for {var}: {value}")]
    UnsupportedValue {
        /// Variable name (e.g., `GEMINI_GROUNDING`).
        var: &'static str,
        /// Offending value as read from the environment.
        value: String,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[Recommend Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `GEMINI_ENDPOINT`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[Recommend Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Model name was empty.
    #[error("[Recommend Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Endpoint errors                                                           */
/* ------------------------------------------------------------------------- */

/// Details of a non-successful HTTP exchange.
#[derive(Debug)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL (without credentials).
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
}

/// Errors raised while talking to the generative endpoint.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The API key could not be encoded as a header value.
    #[error("[Recommend Service] invalid API key header")]
    InvalidApiKey,

    /// Upstream returned a non-successful HTTP status.
    #[error("[Recommend Service] HTTP {} from {}: {}", .0.status, .0.url, .0.snippet)]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as a `generateContent` envelope.
    #[error("[Recommend Service] decode error: {0}")]
    Decode(String),
}

/* ------------------------------------------------------------------------- */
/* Location errors                                                           */
/* ------------------------------------------------------------------------- */

/// Device location problems that block a submission.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    /// No capability, still pending, or timed out.
    #[error("[Recommend Service] location is unavailable")]
    Unavailable,

    /// The user refused the permission; terminal for the session.
    #[error("[Recommend Service] location permission denied")]
    Denied,
}

/* ------------------------------------------------------------------------- */
/* Snippets                                                                  */
/* ------------------------------------------------------------------------- */

/// Returns a trimmed, single-line prefix of an upstream body for logs and errors.
pub fn make_snippet(body: &str) -> String {
    const MAX: usize = 300;
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= MAX {
        return flat;
    }
    let mut end = MAX;
    while end > 0 && !flat.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &flat[..end])
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads an optional, non-empty environment variable.
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match env_opt(name) {
        Some(v) => v.trim().parse::<u64>().map(Some).map_err(|_| {
            RecommendError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional `f32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a valid `f32`.
pub fn env_opt_f32(name: &'static str) -> Result<Option<f32>> {
    match env_opt(name) {
        Some(v) => v.trim().parse::<f32>().map(Some).map_err(|_| {
            RecommendError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected f32",
            })
        }),
        None => Ok(None),
    }
}

/// Parses a boolean flag from env; accepts `true/false/1/0/yes/no`.
///
/// # Errors
/// Returns [`ConfigError::UnsupportedValue`] for anything else.
pub fn env_flag(name: &'static str, default: bool) -> Result<bool> {
    match env_opt(name) {
        None => Ok(default),
        Some(v) => match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::UnsupportedValue {
                var: name,
                value: v,
            }
            .into()),
        },
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers (return unified `Result<T>`)                           */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] when the string does not start with
/// a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] if `value` is outside `[min, max]`.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}
