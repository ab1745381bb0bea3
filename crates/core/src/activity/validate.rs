use serde::Serialize;

use super::types::SuggestResponse;

/// A single rule broken by a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// JSON-ish path, e.g. `activities[1].duration_max`
    pub path: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Check a typed response before it is returned to the client.
///
/// Returns every violation found; an empty list means the response is valid.
pub fn validate_response(response: &SuggestResponse) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if !(1..=10).contains(&response.note) {
        violations.push(FieldViolation::new(
            "note",
            format!("must be between 1 and 10, got {}", response.note),
        ));
    }

    if response.activities.is_empty() {
        violations.push(FieldViolation::new("activities", "must not be empty"));
    }

    for (i, activity) in response.activities.iter().enumerate() {
        let path = |field: &str| format!("activities[{}].{}", i, field);

        if activity.id.trim().is_empty() {
            violations.push(FieldViolation::new(path("id"), "must not be empty"));
        }
        if activity.title.trim().is_empty() {
            violations.push(FieldViolation::new(path("title"), "must not be empty"));
        }
        if !activity.price_eur.is_finite() || activity.price_eur < 0.0 {
            violations.push(FieldViolation::new(
                path("price_eur"),
                "must be a non-negative number",
            ));
        }
        if activity.duration_min < 0 {
            violations.push(FieldViolation::new(
                path("duration_min"),
                "must not be negative",
            ));
        }
        if activity.duration_max < activity.duration_min {
            violations.push(FieldViolation::new(
                path("duration_max"),
                "must be greater than or equal to duration_min",
            ));
        }

        let location = &activity.location;
        if !location.lat.is_finite() || !(-90.0..=90.0).contains(&location.lat) {
            violations.push(FieldViolation::new(path("location.lat"), "out of range"));
        }
        if !location.lng.is_finite() || !(-180.0..=180.0).contains(&location.lng) {
            violations.push(FieldViolation::new(path("location.lng"), "out of range"));
        }
        if let Some(rating) = activity.rating_google {
            if !rating.is_finite() {
                violations.push(FieldViolation::new(path("rating_google"), "not a number"));
            }
        }
    }

    violations
}
