//! Common test utilities for HTTP testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock dependencies injected, so every endpoint can be exercised
//! without network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use where2_core::{
    config::{OpenAiConfig, SuggestConfig},
    images::{ImageFinder, ImageSource},
    maps::{RouteLeg, TravelMode},
    suggest::Enricher,
    testing::{MockChatClient, MockImageSource, MockMaps, MockWeather},
    ActivityStore, Config, SuggestionPipeline,
};

/// Re-export fixtures for test convenience
pub use where2_core::testing::fixtures;

/// Test fixture with controllable mocks for:
/// - the chat model (MockChatClient)
/// - the weather service (MockWeather)
/// - directions, geocoding and places (MockMaps)
/// - image search (MockImageSource)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_suggest() {
///     let fixture = TestFixture::new().await;
///     fixture.chat.push_content(&fixtures::llm_content()).await;
///
///     let response = fixture.post("/suggest", suggest_body()).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub chat: Arc<MockChatClient>,
    pub weather: Arc<MockWeather>,
    pub maps: Arc<MockMaps>,
    pub images: Arc<MockImageSource>,
    pub store: Arc<ActivityStore>,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

pub const PLACEHOLDER_URL: &str = "https://placeholder.test/activity.jpg";

impl TestFixture {
    /// Create a fixture with a 1200 m / 15 min walking leg for every route.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let chat = Arc::new(MockChatClient::new());
        let weather = Arc::new(MockWeather::new());
        let maps = Arc::new(MockMaps::new());
        maps.set_leg(
            TravelMode::Walking,
            RouteLeg {
                distance_m: 1200,
                duration_s: 900,
                summary: String::new(),
            },
        )
        .await;
        let images = Arc::new(MockImageSource::new("mock"));
        let store = Arc::new(ActivityStore::new());

        let finder = ImageFinder::new(PLACEHOLDER_URL)
            .with_source(Arc::clone(&images) as Arc<dyn ImageSource>);
        let enricher = Enricher::new(maps.clone(), Arc::new(finder));

        let pipeline = SuggestionPipeline::new(
            chat.clone(),
            weather.clone(),
            enricher,
            Arc::clone(&store),
            config.openai.clone(),
            config.suggest.clone(),
        );

        let state = Arc::new(where2_server::state::AppState::new(config, pipeline));
        let router = where2_server::api::create_router(state);

        Self {
            router,
            chat,
            weather,
            maps,
            images,
            store,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Defaults with a short mock delay and a fixed sampling temperature.
pub fn test_config() -> Config {
    Config {
        openai: OpenAiConfig {
            temperature: Some(0.7),
            ..Default::default()
        },
        suggest: SuggestConfig {
            mock_delay_ms: 10,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A valid suggestion request body.
pub fn suggest_body() -> Value {
    json!({
        "answers": {
            "canceled_activity": "Cinéma",
            "same_type": false,
            "budget": 30,
            "available_time": 180
        },
        "location": { "lat": 48.8566, "lng": 2.3522 },
        "datetime": "2025-06-14T15:30:00"
    })
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
