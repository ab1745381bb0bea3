//! Current weather lookup (OpenWeatherMap).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::{mask_secret, WeatherConfig};

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse weather response: {0}")]
    Parse(String),
}

/// Weather at the user's position, as used in prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub description: String,
    /// °C
    pub temperature: f64,
    /// °C
    pub feels_like: f64,
    /// %
    pub humidity: f64,
    /// m/s
    pub wind_speed: f64,
    pub is_rainy: bool,
    pub is_snowy: bool,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, lat: f64, lng: f64) -> Result<WeatherData, WeatherError>;
}

/// OpenWeatherMap current-weather client.
pub struct OpenWeatherClient {
    client: Client,
    config: WeatherConfig,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn build_url(&self, lat: f64, lng: f64) -> String {
        format!(
            "{}/data/2.5/weather?lat={}&lon={}&appid={}&units=metric&lang={}",
            self.config.api_base.trim_end_matches('/'),
            lat,
            lng,
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&self.config.language)
        )
    }
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    #[serde(default)]
    weather: Vec<OwmCondition>,
    main: OwmMain,
    #[serde(default)]
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmError {
    message: String,
}

impl From<OwmResponse> for WeatherData {
    fn from(response: OwmResponse) -> Self {
        let is_rainy = response
            .weather
            .iter()
            .any(|w| matches!(w.main.as_str(), "Rain" | "Drizzle" | "Thunderstorm"));
        let is_snowy = response.weather.iter().any(|w| w.main == "Snow");

        Self {
            description: response
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_default(),
            temperature: response.main.temp,
            feels_like: response.main.feels_like,
            humidity: response.main.humidity,
            wind_speed: response.wind.map(|w| w.speed).unwrap_or(0.0),
            is_rainy,
            is_snowy,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, lat: f64, lng: f64) -> Result<WeatherData, WeatherError> {
        debug!(
            lat,
            lng,
            api_key = %mask_secret(&self.config.api_key),
            "Fetching current weather"
        );

        let response = self
            .client
            .get(self.build_url(lat, lng))
            .send()
            .await
            .map_err(|e| WeatherError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OwmError>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(WeatherError::Api { status, message });
        }

        let owm: OwmResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let weather = WeatherData::from(owm);
        debug!(?weather, "Weather received");
        Ok(weather)
    }
}
