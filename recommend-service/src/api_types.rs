//! Public request/result types shared with the HTTP layer.
//!
//! Field names on the wire follow what the web page already consumes:
//! a result is `{ text, restaurants }` and a restaurant is
//! `{ title, uri, description?, rating?, reviews? }`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error_handler::{RecommendError, Result},
    location::Coordinates,
};

/// Smallest accepted search radius, in meters.
pub const MIN_RADIUS_M: u32 = 100;

/// Largest accepted search radius, in meters.
pub const MAX_RADIUS_M: u32 = 2000;

/// Which meal the user is looking for. Selects the prompt focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealKind {
    Lunch,
    Dinner,
}

impl MealKind {
    /// Korean label used in prompts and UI copy.
    pub fn label(self) -> &'static str {
        match self {
            MealKind::Lunch => "점심",
            MealKind::Dinner => "저녁",
        }
    }
}

impl fmt::Display for MealKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealKind::Lunch => f.write_str("lunch"),
            MealKind::Dinner => f.write_str("dinner"),
        }
    }
}

/// One user action's worth of input.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub meal_kind: MealKind,
    /// Search radius in meters, `MIN_RADIUS_M..=MAX_RADIUS_M`.
    pub radius_meters: u32,
    /// `None` means the named fallback area is used.
    pub coordinates: Option<Coordinates>,
}

impl RecommendationRequest {
    /// Builds a request, rejecting radii outside the supported range.
    ///
    /// # Errors
    /// Returns [`RecommendError::InvalidRadius`] when `radius_meters` is out of range.
    pub fn new(
        meal_kind: MealKind,
        radius_meters: u32,
        coordinates: Option<Coordinates>,
    ) -> Result<Self> {
        let req = Self {
            meal_kind,
            radius_meters,
            coordinates,
        };
        req.validate()?;
        Ok(req)
    }

    /// Re-checks the radius bound (fields are public).
    pub fn validate(&self) -> Result<()> {
        if (MIN_RADIUS_M..=MAX_RADIUS_M).contains(&self.radius_meters) {
            Ok(())
        } else {
            Err(RecommendError::InvalidRadius {
                got: self.radius_meters,
                min: MIN_RADIUS_M,
                max: MAX_RADIUS_M,
            })
        }
    }
}

/// A single recommended place as shown on a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    /// Always non-empty (placeholder if the model omitted it).
    pub title: String,
    /// Always non-empty (synthesized map-search link if the model omitted it).
    #[serde(rename = "uri")]
    pub link_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Passed through as reported; `None` only for grounding-chunk records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Review snippets from maps grounding, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<String>,
}

/// Normalized answer for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    #[serde(rename = "text")]
    pub summary_text: String,
    pub restaurants: Vec<RestaurantRecord>,
}
