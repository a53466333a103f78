//! Device location as reported by the page, and how it gates a submission.

use serde::{Deserialize, Serialize};

use crate::error_handler::LocationError;

/// Latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// False for NaN/infinite values or anything outside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Permission state of the browser geolocation capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    /// Prompt shown, or the one-shot query has not resolved yet.
    Pending,
    /// The browser has no geolocation capability.
    Unsupported,
}

/// Location snapshot submitted together with a recommendation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationStatus {
    pub status: PermissionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl LocationStatus {
    pub fn granted(coords: Coordinates) -> Self {
        Self {
            status: PermissionState::Granted,
            latitude: Some(coords.latitude),
            longitude: Some(coords.longitude),
        }
    }

    /// Coordinates if both halves are present and valid.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            })
            .filter(Coordinates::is_valid),
            _ => None,
        }
    }

    /// Turns the snapshot into request coordinates.
    ///
    /// - granted with coordinates → `Some(coords)`
    /// - denied → [`LocationError::Denied`], regardless of `allow_fallback`
    /// - anything else → `Ok(None)` if `allow_fallback`, else [`LocationError::Unavailable`]
    pub fn resolve(&self, allow_fallback: bool) -> Result<Option<Coordinates>, LocationError> {
        match (self.status, self.coordinates()) {
            (PermissionState::Denied, _) => Err(LocationError::Denied),
            (PermissionState::Granted, Some(c)) => Ok(Some(c)),
            _ if allow_fallback => Ok(None),
            _ => Err(LocationError::Unavailable),
        }
    }
}
