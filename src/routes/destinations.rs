use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::destinations::{Destination, DESTINATIONS};

/// Response item for GET /api/v1/destinations.
#[derive(Debug, Serialize, ToSchema)]
pub struct DestinationItem {
    /// Display name, accepted by the conditions endpoint
    pub name: String,
    /// Town the forecast is taken for
    pub city: String,
    pub country: String,
    /// Latitude (WGS84)
    pub latitude: f64,
    /// Longitude (WGS84)
    pub longitude: f64,
}

impl From<&Destination> for DestinationItem {
    fn from(d: &Destination) -> Self {
        Self {
            name: d.name.to_string(),
            city: d.city.to_string(),
            country: d.country.to_string(),
            latitude: d.latitude,
            longitude: d.longitude,
        }
    }
}

/// List all supported destinations.
#[utoipa::path(
    get,
    path = "/api/v1/destinations",
    tag = "Destinations",
    responses(
        (status = 200, description = "Supported climbing destinations", body = Vec<DestinationItem>),
    )
)]
pub async fn list_destinations() -> Json<Vec<DestinationItem>> {
    Json(DESTINATIONS.iter().map(DestinationItem::from).collect())
}
