use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub maps: MapsConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
}

impl Config {
    /// Names of required API keys that are empty.
    pub fn missing_api_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openai.api_key.trim().is_empty() {
            missing.push("openai.api_key");
        }
        if self.weather.api_key.trim().is_empty() {
            missing.push("weather.api_key");
        }
        if self.maps.api_key.trim().is_empty() {
            missing.push("maps.api_key");
        }
        missing
    }
}

/// Deployment environment.
///
/// In production, missing API keys abort startup; in development they are
/// only reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

/// OpenAI chat-completions configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    /// Model used by `/suggest`
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used by `/suggest-o3`
    #[serde(default = "default_reasoning_model")]
    pub reasoning_model: String,
    #[serde(default = "default_openai_base")]
    pub api_base: String,
    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u32,
    /// Upper bound on request/tool-reply round trips per conversation
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Sampling temperature for the default model. Never sent to the reasoning model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            reasoning_model: default_reasoning_model(),
            api_base: default_openai_base(),
            timeout_secs: default_openai_timeout(),
            max_iterations: default_max_iterations(),
            temperature: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_reasoning_model() -> String {
    "o3".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_timeout() -> u32 {
    120
}

fn default_max_iterations() -> u32 {
    5
}

/// OpenWeatherMap configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_weather_base")]
    pub api_base: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_weather_base(),
            language: default_language(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_weather_base() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_timeout() -> u32 {
    10
}

/// Google Maps Platform configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapsConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_maps_base")]
    pub api_base: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Walking routes longer than this (minutes) are replaced by transit when possible
    #[serde(default = "default_walking_threshold")]
    pub walking_threshold_min: u32,
    /// Replace LLM-provided coordinates with geocoded ones when available
    #[serde(default = "default_true")]
    pub geocode_refinement: bool,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_maps_base(),
            language: default_language(),
            walking_threshold_min: default_walking_threshold(),
            geocode_refinement: true,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_maps_base() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_walking_threshold() -> u32 {
    15
}

fn default_true() -> bool {
    true
}

/// Image lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    /// SerpAPI key; the image-search fallback is skipped when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi_api_key: Option<String>,
    #[serde(default = "default_serpapi_base")]
    pub serpapi_base: String,
    #[serde(default = "default_placeholder_url")]
    pub placeholder_url: String,
    #[serde(default = "default_photo_max_width")]
    pub photo_max_width: u32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            serpapi_api_key: None,
            serpapi_base: default_serpapi_base(),
            placeholder_url: default_placeholder_url(),
            photo_max_width: default_photo_max_width(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_serpapi_base() -> String {
    "https://serpapi.com".to_string()
}

fn default_placeholder_url() -> String {
    "https://via.placeholder.com/300x200?text=Image+non+disponible".to_string()
}

fn default_photo_max_width() -> u32 {
    800
}

/// Defaults applied to quiz answers, plus the mock endpoint delay
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SuggestConfig {
    /// Euros
    #[serde(default = "default_budget")]
    pub default_budget: f64,
    /// Minutes
    #[serde(default = "default_travel_time")]
    pub default_travel_time: f64,
    /// 1-10 scale
    #[serde(default = "default_energy_level")]
    pub default_energy_level: f64,
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            default_budget: default_budget(),
            default_travel_time: default_travel_time(),
            default_energy_level: default_energy_level(),
            mock_delay_ms: default_mock_delay_ms(),
        }
    }
}

fn default_budget() -> f64 {
    50.0
}

fn default_travel_time() -> f64 {
    20.0
}

fn default_energy_level() -> f64 {
    4.0
}

fn default_mock_delay_ms() -> u64 {
    5000
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub openai: SanitizedOpenAiConfig,
    pub weather: SanitizedServiceConfig,
    pub maps: SanitizedMapsConfig,
    pub images: SanitizedImagesConfig,
    pub suggest: SuggestConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedOpenAiConfig {
    pub api_key_configured: bool,
    pub model: String,
    pub reasoning_model: String,
    pub api_base: String,
    pub timeout_secs: u32,
    pub max_iterations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServiceConfig {
    pub api_key_configured: bool,
    pub api_base: String,
    pub language: String,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMapsConfig {
    pub api_key_configured: bool,
    pub api_base: String,
    pub language: String,
    pub walking_threshold_min: u32,
    pub geocode_refinement: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedImagesConfig {
    pub serpapi_api_key_configured: bool,
    pub serpapi_base: String,
    pub placeholder_url: String,
    pub photo_max_width: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            environment: config.environment,
            server: config.server.clone(),
            openai: SanitizedOpenAiConfig {
                api_key_configured: !config.openai.api_key.is_empty(),
                model: config.openai.model.clone(),
                reasoning_model: config.openai.reasoning_model.clone(),
                api_base: config.openai.api_base.clone(),
                timeout_secs: config.openai.timeout_secs,
                max_iterations: config.openai.max_iterations,
                temperature: config.openai.temperature,
            },
            weather: SanitizedServiceConfig {
                api_key_configured: !config.weather.api_key.is_empty(),
                api_base: config.weather.api_base.clone(),
                language: config.weather.language.clone(),
                timeout_secs: config.weather.timeout_secs,
            },
            maps: SanitizedMapsConfig {
                api_key_configured: !config.maps.api_key.is_empty(),
                api_base: config.maps.api_base.clone(),
                language: config.maps.language.clone(),
                walking_threshold_min: config.maps.walking_threshold_min,
                geocode_refinement: config.maps.geocode_refinement,
                timeout_secs: config.maps.timeout_secs,
            },
            images: SanitizedImagesConfig {
                serpapi_api_key_configured: config
                    .images
                    .serpapi_api_key
                    .as_ref()
                    .map(|k| !k.is_empty())
                    .unwrap_or(false),
                serpapi_base: config.images.serpapi_base.clone(),
                placeholder_url: config.images.placeholder_url.clone(),
                photo_max_width: config.images.photo_max_width,
            },
            suggest: config.suggest.clone(),
        }
    }
}
