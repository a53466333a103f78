use recommend_service::{LocationStatus, MealKind, PermissionState};
use serde::Deserialize;

/// Request payload for `POST /recommendations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendBody {
    pub meal_kind: MealKind,
    /// Search radius, 100..=2000 meters.
    pub radius_meters: u32,
    /// Browser geolocation snapshot. Missing means the page never got an answer.
    #[serde(default)]
    pub location: Option<LocationStatus>,
}

impl RecommendBody {
    pub fn location_or_pending(&self) -> LocationStatus {
        self.location.unwrap_or(LocationStatus {
            status: PermissionState::Pending,
            latitude: None,
            longitude: None,
        })
    }
}
