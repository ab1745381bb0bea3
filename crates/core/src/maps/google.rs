//! Google Maps Platform client: Directions, Geocoding and Places Text Search.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{MapsError, MapsProvider, PlaceSummary, RouteLeg, TravelMode};
use crate::activity::Coordinates;
use crate::config::MapsConfig;

/// Google Maps web-service client.
pub struct GoogleMapsClient {
    client: Client,
    config: MapsConfig,
}

impl GoogleMapsClient {
    pub fn new(config: MapsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    fn directions_url(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
    ) -> String {
        format!(
            "{}/maps/api/directions/json?origin={}&destination={}&mode={}&language={}&key={}",
            self.base(),
            urlencoding::encode(&origin.to_query()),
            urlencoding::encode(&destination.to_query()),
            mode.as_str(),
            urlencoding::encode(&self.config.language),
            urlencoding::encode(&self.config.api_key)
        )
    }

    fn geocode_url(&self, address: &str) -> String {
        format!(
            "{}/maps/api/geocode/json?address={}&language={}&key={}",
            self.base(),
            urlencoding::encode(address),
            urlencoding::encode(&self.config.language),
            urlencoding::encode(&self.config.api_key)
        )
    }

    fn text_search_url(&self, query: &str) -> String {
        format!(
            "{}/maps/api/place/textsearch/json?query={}&language={}&key={}",
            self.base(),
            urlencoding::encode(query),
            urlencoding::encode(&self.config.language),
            urlencoding::encode(&self.config.api_key)
        )
    }

    async fn get_json<T>(&self, url: &str) -> Result<Option<T>, MapsError>
    where
        T: DeserializeOwned + GoogleStatus,
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MapsError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MapsError::Api(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: T = response
            .json()
            .await
            .map_err(|e| MapsError::Parse(e.to_string()))?;

        match parsed.status() {
            "OK" => Ok(Some(parsed)),
            "ZERO_RESULTS" | "NOT_FOUND" => Ok(None),
            other => Err(MapsError::Api(match parsed.error_message() {
                Some(message) => format!("{}: {}", other, message),
                None => other.to_string(),
            })),
        }
    }
}

/// Every Google web-service response carries a `status` field.
trait GoogleStatus {
    fn status(&self) -> &str;
    fn error_message(&self) -> Option<&str>;
}

macro_rules! impl_google_status {
    ($($ty:ty),*) => {
        $(impl GoogleStatus for $ty {
            fn status(&self) -> &str {
                &self.status
            }
            fn error_message(&self) -> Option<&str> {
                self.error_message.as_deref()
            }
        })*
    };
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: TextValue,
    duration: TextValue,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: i64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: Coordinates,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<TextSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    name: String,
    place_id: String,
    #[serde(default)]
    photos: Vec<PlacePhoto>,
}

#[derive(Debug, Deserialize)]
struct PlacePhoto {
    photo_reference: String,
}

impl_google_status!(DirectionsResponse, GeocodeResponse, TextSearchResponse);

impl DirectionsResponse {
    fn first_leg(self) -> Option<RouteLeg> {
        let route = self.routes.into_iter().next()?;
        let leg = route.legs.into_iter().next()?;
        Some(RouteLeg {
            distance_m: leg.distance.value,
            duration_s: leg.duration.value,
            summary: route.summary,
        })
    }
}

#[async_trait]
impl MapsProvider for GoogleMapsClient {
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
    ) -> Result<Option<RouteLeg>, MapsError> {
        debug!(?origin, ?destination, mode = mode.as_str(), "Requesting directions");
        let url = self.directions_url(origin, destination, mode);
        let response: Option<DirectionsResponse> = self.get_json(&url).await?;
        Ok(response.and_then(DirectionsResponse::first_leg))
    }

    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, MapsError> {
        debug!(address, "Geocoding address");
        let url = self.geocode_url(address);
        let response: Option<GeocodeResponse> = self.get_json(&url).await?;
        Ok(response
            .and_then(|r| r.results.into_iter().next())
            .map(|r| r.geometry.location))
    }

    async fn find_place(&self, query: &str) -> Result<Option<PlaceSummary>, MapsError> {
        debug!(query, "Searching place");
        let url = self.text_search_url(query);
        let response: Option<TextSearchResponse> = self.get_json(&url).await?;
        Ok(response
            .and_then(|r| r.results.into_iter().next())
            .map(|place| PlaceSummary {
                place_id: place.place_id,
                name: place.name,
                photo_reference: place.photos.into_iter().next().map(|p| p.photo_reference),
            }))
    }

    fn photo_url(&self, photo_reference: &str, max_width: u32) -> String {
        format!(
            "{}/maps/api/place/photo?maxwidth={}&photoreference={}&key={}",
            self.base(),
            max_width,
            urlencoding::encode(photo_reference),
            urlencoding::encode(&self.config.api_key)
        )
    }
}
