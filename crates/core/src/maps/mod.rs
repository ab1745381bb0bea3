//! Travel distance/time and place lookups (Google Maps Platform).

mod google;
mod route;

pub use google::GoogleMapsClient;
pub use route::{calculate_route, refine_coordinates, RouteData};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::Coordinates;

#[derive(Debug, Error)]
pub enum MapsError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No route found")]
    NoRoute,
}

/// Directions travel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Transit => "transit",
        }
    }
}

/// First leg of the first route returned by a directions query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_m: i64,
    pub duration_s: i64,
    #[serde(default)]
    pub summary: String,
}

/// A place found by text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    pub place_id: String,
    pub name: String,
    /// Reference of the first photo, if the place has any
    pub photo_reference: Option<String>,
}

/// The maps calls the suggestion pipeline needs.
///
/// `Ok(None)` means the API answered but found nothing.
#[async_trait]
pub trait MapsProvider: Send + Sync {
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
    ) -> Result<Option<RouteLeg>, MapsError>;

    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, MapsError>;

    async fn find_place(&self, query: &str) -> Result<Option<PlaceSummary>, MapsError>;

    /// URL of a place photo, suitable for `image_url`.
    fn photo_url(&self, photo_reference: &str, max_width: u32) -> String;
}
