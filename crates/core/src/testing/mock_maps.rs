//! Mock maps provider for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::activity::Coordinates;
use crate::maps::{MapsError, MapsProvider, PlaceSummary, RouteLeg, TravelMode};

/// Mock implementation of the MapsProvider trait.
///
/// Provides controllable behavior for testing:
/// - one route leg per travel mode, whatever the endpoints
/// - a geocoding table keyed by the exact query
/// - a single place returned by every place search
/// - per-mode directions failures
///
/// Anything not configured is "not found".
#[derive(Debug, Default)]
pub struct MockMaps {
    legs: Arc<RwLock<HashMap<TravelMode, RouteLeg>>>,
    failing_modes: Arc<RwLock<HashSet<TravelMode>>>,
    directions_calls: Arc<RwLock<Vec<TravelMode>>>,
    geocodes: Arc<RwLock<HashMap<String, Coordinates>>>,
    geocode_calls: Arc<RwLock<Vec<String>>>,
    place: Arc<RwLock<Option<PlaceSummary>>>,
    place_queries: Arc<RwLock<Vec<String>>>,
}

impl MockMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_leg(&self, mode: TravelMode, leg: RouteLeg) {
        self.legs.write().await.insert(mode, leg);
    }

    /// Make directions for `mode` fail.
    pub async fn fail_mode(&self, mode: TravelMode) {
        self.failing_modes.write().await.insert(mode);
    }

    pub async fn directions_count(&self, mode: TravelMode) -> usize {
        self.directions_calls
            .read()
            .await
            .iter()
            .filter(|m| **m == mode)
            .count()
    }

    pub async fn set_geocode(&self, query: &str, coordinates: Coordinates) {
        self.geocodes
            .write()
            .await
            .insert(query.to_string(), coordinates);
    }

    pub async fn geocode_count(&self) -> usize {
        self.geocode_calls.read().await.len()
    }

    pub async fn set_place(&self, place: PlaceSummary) {
        *self.place.write().await = Some(place);
    }

    pub async fn place_queries(&self) -> Vec<String> {
        self.place_queries.read().await.clone()
    }
}

#[async_trait]
impl MapsProvider for MockMaps {
    async fn directions(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
        mode: TravelMode,
    ) -> Result<Option<RouteLeg>, MapsError> {
        self.directions_calls.write().await.push(mode);

        if self.failing_modes.read().await.contains(&mode) {
            return Err(MapsError::Api(format!("mock {} failure", mode.as_str())));
        }

        Ok(self.legs.read().await.get(&mode).cloned())
    }

    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, MapsError> {
        self.geocode_calls.write().await.push(address.to_string());
        Ok(self.geocodes.read().await.get(address).copied())
    }

    async fn find_place(&self, query: &str) -> Result<Option<PlaceSummary>, MapsError> {
        self.place_queries.write().await.push(query.to_string());
        Ok(self.place.read().await.clone())
    }

    fn photo_url(&self, photo_reference: &str, max_width: u32) -> String {
        format!(
            "https://photos.test/{}?maxwidth={}",
            photo_reference, max_width
        )
    }
}
