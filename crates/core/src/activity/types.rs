use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::config::SuggestConfig;

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite, in range, and not the `(0, 0)` placeholder LLMs emit when unsure.
    pub fn is_usable(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
            && !(self.lat == 0.0 && self.lng == 0.0)
    }

    /// `lat,lng` as expected by the Google APIs.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// Where an activity takes place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    pub fn set_coordinates(&mut self, coords: Coordinates) {
        self.lat = coords.lat;
        self.lng = coords.lng;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenHours {
    pub day: String,
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organizer {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

/// How the user gets to the activity. Serialized as `1` (walking) or `2` (transit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TravelType {
    Walking,
    Transit,
}

impl From<TravelType> for u8 {
    fn from(value: TravelType) -> Self {
        match value {
            TravelType::Walking => 1,
            TravelType::Transit => 2,
        }
    }
}

impl TryFrom<u8> for TravelType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TravelType::Walking),
            2 => Ok(TravelType::Transit),
            other => Err(format!("invalid travel_type: {}", other)),
        }
    }
}

/// A suggested activity as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price_eur: f64,
    #[serde(deserialize_with = "lenient_int")]
    pub duration_min: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub duration_max: i64,
    pub location: Location,
    /// Filled by route enrichment
    #[serde(default, deserialize_with = "lenient_opt_int")]
    pub distance_m: Option<i64>,
    /// Seconds; filled by route enrichment
    #[serde(default, deserialize_with = "lenient_opt_int")]
    pub estimated_travel_time: Option<i64>,
    /// Filled by route enrichment. Values other than `1`/`2` read as `None`.
    #[serde(default, deserialize_with = "lenient_travel_type")]
    pub travel_type: Option<TravelType>,
    pub indoor: bool,
    pub authentic: bool,
    pub temporary: bool,
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating_google: Option<f64>,
    #[serde(default)]
    pub reviews_count: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    pub is_free: bool,
    pub is_student_free: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub open_hours: Option<Vec<OpenHours>>,
    #[serde(default)]
    pub date_special: Option<String>,
    #[serde(default)]
    pub organizer: Option<Organizer>,
}

/// Final response body of the suggestion endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub activities: Vec<Activity>,
    pub note: i64,
    pub note_reasons: String,
}

/// LLM output before strict typing.
///
/// Activities stay as raw JSON so missing fields can be detected and repaired
/// before they are forced into [`Activity`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSuggestResponse {
    #[serde(default)]
    pub activities: Vec<Value>,
    #[serde(default)]
    pub note: Option<Value>,
    #[serde(default)]
    pub note_reasons: Option<String>,
}

impl RawSuggestResponse {
    /// Convert to the typed response.
    ///
    /// Activities that cannot be typed are dropped with a warning. A missing
    /// or non-numeric note becomes `0`, which response validation rejects.
    pub fn into_typed(self) -> SuggestResponse {
        let activities = self
            .activities
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<Activity>(value) {
                Ok(activity) => Some(activity),
                Err(e) => {
                    warn!(index, error = %e, "Dropping activity that does not match the schema");
                    None
                }
            })
            .collect();

        let note = self
            .note
            .as_ref()
            .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)))
            .unwrap_or(0);

        SuggestResponse {
            activities,
            note,
            note_reasons: self.note_reasons.unwrap_or_default(),
        }
    }
}

/// Quiz answers sent by the client.
///
/// Unknown keys are accepted and kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answers {
    pub canceled_activity: String,
    pub same_type: bool,
    /// Euros
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<f64>,
    /// 1-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<f64>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indoor_preference: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentic_preference: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_preference: Option<bool>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Answers {
    /// Fill missing budget, travel time and energy level from configuration.
    pub fn with_defaults(mut self, defaults: &SuggestConfig) -> Self {
        self.budget.get_or_insert(defaults.default_budget);
        self.travel_time.get_or_insert(defaults.default_travel_time);
        self.energy_level.get_or_insert(defaults.default_energy_level);
        self
    }
}

/// Body of `POST /suggest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub answers: Answers,
    pub location: Coordinates,
    /// ISO date-time of the request; server time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refine: Option<bool>,
    #[serde(
        default,
        rename = "excludeIds",
        alias = "exclude_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub exclude_ids: Option<Vec<String>>,
}

fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("expected a finite number"));
    }
    Ok(value.round() as i64)
}

fn lenient_opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).map(|v| v.round() as i64))
}

fn lenient_travel_type<'de, D>(deserializer: D) -> Result<Option<TravelType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .and_then(|n| TravelType::try_from(n).ok()))
}
