//! Testing utilities and mock implementations.
//!
//! Every external seam of the suggestion pipeline has a mock here, so the
//! pipeline and the HTTP layer can be tested without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use where2_core::testing::{fixtures, MockChatClient, MockMaps, MockWeather};
//!
//! let chat = MockChatClient::new();
//! chat.push_content(&fixtures::llm_content()).await;
//!
//! let maps = MockMaps::new();
//! maps.set_leg(TravelMode::Walking, leg).await;
//!
//! // Build a SuggestionPipeline with the mocks...
//! ```

mod mock_chat;
mod mock_image_source;
mod mock_maps;
mod mock_weather;

pub use mock_chat::{MockChatClient, MOCK_TURN_USAGE};
pub use mock_image_source::MockImageSource;
pub use mock_maps::MockMaps;
pub use mock_weather::MockWeather;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::activity::Activity;
    use crate::weather::WeatherData;

    /// Mild, dry weather.
    pub fn weather() -> WeatherData {
        WeatherData {
            description: "ciel dégagé".to_string(),
            temperature: 21.5,
            feels_like: 21.0,
            humidity: 40.0,
            wind_speed: 3.1,
            is_rainy: false,
            is_snowy: false,
        }
    }

    /// A complete activity as the model would return it.
    pub fn activity_json(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "description": format!("Découverte de {}", title),
            "price_eur": 15,
            "duration_min": 60,
            "duration_max": 120,
            "location": {
                "name": title,
                "address": "Rue de Rivoli, 75001 Paris",
                "lat": 48.8606,
                "lng": 2.3376
            },
            "distance_m": null,
            "estimated_travel_time": null,
            "travel_type": null,
            "indoor": true,
            "authentic": false,
            "temporary": false,
            "tags": ["culture", "musée"],
            "rating_google": 4.6,
            "reviews_count": 12000,
            "image_url": null,
            "external_url": null,
            "is_free": false,
            "is_student_free": true,
            "language": "fr",
            "open_hours": [{ "day": "Lundi", "open": "09:00", "close": "18:00" }],
            "date_special": null,
            "organizer": null
        })
    }

    pub fn activity(id: &str, title: &str) -> Activity {
        serde_json::from_value(activity_json(id, title)).expect("fixture activity is valid")
    }

    /// Final model content with three complete activities.
    pub fn llm_content() -> String {
        json!({
            "activities": [
                activity_json("act_01", "Musée du Louvre"),
                activity_json("act_02", "Musée d'Orsay"),
                activity_json("act_03", "Centre Pompidou")
            ],
            "note": 8,
            "note_reasons": "Activités réelles proches, adaptées à la météo."
        })
        .to_string()
    }

    /// Fixed three-activity response, also served by the delayed mock
    /// endpoint.
    pub use crate::activity::sample_response as suggest_response;
}
