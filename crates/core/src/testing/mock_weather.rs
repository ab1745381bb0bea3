//! Mock weather provider for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::fixtures;
use crate::weather::{WeatherData, WeatherError, WeatherProvider};

/// Mock implementation of the WeatherProvider trait.
///
/// Returns `fixtures::weather()` unless configured otherwise.
#[derive(Debug)]
pub struct MockWeather {
    weather: Arc<RwLock<WeatherData>>,
    /// When set, every call fails with this message.
    error: Arc<RwLock<Option<String>>>,
    /// Recorded (lat, lng) pairs.
    calls: Arc<RwLock<Vec<(f64, f64)>>>,
}

impl Default for MockWeather {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWeather {
    pub fn new() -> Self {
        Self {
            weather: Arc::new(RwLock::new(fixtures::weather())),
            error: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_weather(&self, weather: WeatherData) {
        *self.weather.write().await = weather;
    }

    pub async fn fail_with(&self, message: &str) {
        *self.error.write().await = Some(message.to_string());
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl WeatherProvider for MockWeather {
    async fn current(&self, lat: f64, lng: f64) -> Result<WeatherData, WeatherError> {
        self.calls.write().await.push((lat, lng));

        if let Some(message) = self.error.read().await.clone() {
            return Err(WeatherError::Api {
                status: 503,
                message,
            });
        }

        Ok(self.weather.read().await.clone())
    }
}
