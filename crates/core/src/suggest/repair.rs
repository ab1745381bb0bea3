//! Parsing of the model's JSON and the missing-field repair pass.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::conversation::{Conversation, Purpose};
use super::prompt::build_fill_prompt;
use super::SuggestError;
use crate::activity::RawSuggestResponse;
use crate::llm::LlmUsage;

/// Fields every activity must carry before it is returned.
pub const IMPORTANT_FIELDS: [&str; 12] = [
    "title",
    "description",
    "price_eur",
    "duration_min",
    "duration_max",
    "location",
    "indoor",
    "authentic",
    "temporary",
    "tags",
    "is_free",
    "is_student_free",
];

/// A required field that is null or absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// Index in the activity list
    pub activity: usize,
    pub field: &'static str,
}

/// Result of the repair pass.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub response: RawSuggestResponse,
    /// The fill conversation produced a usable answer
    pub repaired: bool,
    pub iterations: u32,
    pub usage: LlmUsage,
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n?(.*?)\s*```\s*$").expect("valid code fence pattern")
});

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_code_fences(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

/// Parse the model's final content.
pub fn parse_llm_json(text: &str) -> Result<RawSuggestResponse, SuggestError> {
    let body = strip_code_fences(text);
    serde_json::from_str::<RawSuggestResponse>(body).map_err(|e| {
        warn!(
            error = %e,
            content = %body.chars().take(200).collect::<String>(),
            "Model answer is not valid JSON"
        );
        SuggestError::InvalidJson(e.to_string())
    })
}

/// Scan every activity for null or absent important fields.
///
/// `location` counts as missing when it is absent, when `name` or `address`
/// is empty, or when `lat`/`lng` is null.
pub fn find_missing_fields(activities: &[Value]) -> Vec<MissingField> {
    let mut missing = Vec::new();
    for (index, activity) in activities.iter().enumerate() {
        for field in IMPORTANT_FIELDS {
            let present = match field {
                "location" => location_complete(activity.get("location")),
                _ => activity.get(field).is_some_and(|v| !v.is_null()),
            };
            if !present {
                missing.push(MissingField {
                    activity: index,
                    field,
                });
            }
        }
    }
    missing
}

pub fn has_missing_fields(activities: &[Value]) -> bool {
    !find_missing_fields(activities).is_empty()
}

fn location_complete(location: Option<&Value>) -> bool {
    let Some(location) = location.filter(|l| l.is_object()) else {
        return false;
    };
    let non_empty = |key: &str| {
        location
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };
    let non_null = |key: &str| location.get(key).is_some_and(|v| !v.is_null());

    non_empty("name") && non_empty("address") && non_null("lat") && non_null("lng")
}

/// Ask the model to fill the gaps of `initial`.
///
/// Never fails: an LLM error, a conversation without a final answer, bad
/// JSON or an answer without activities all return `initial` unchanged.
pub async fn fill_missing_fields(
    conversation: &Conversation<'_>,
    initial: RawSuggestResponse,
) -> RepairOutcome {
    let prompt = build_fill_prompt(&initial);

    let outcome = match conversation.run(&prompt, Purpose::Fill).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "Fill pass failed, keeping the initial answer");
            return RepairOutcome {
                response: initial,
                repaired: false,
                iterations: 0,
                usage: LlmUsage::default(),
            };
        }
    };

    let unchanged = |initial: RawSuggestResponse| RepairOutcome {
        response: initial,
        repaired: false,
        iterations: outcome.iterations,
        usage: outcome.usage,
    };

    match parse_llm_json(&outcome.content) {
        Ok(filled) if !filled.activities.is_empty() => {
            let remaining = find_missing_fields(&filled.activities).len();
            info!(
                activities = filled.activities.len(),
                remaining_missing = remaining,
                "Fill pass completed"
            );
            RepairOutcome {
                response: filled,
                repaired: true,
                iterations: outcome.iterations,
                usage: outcome.usage,
            }
        }
        Ok(_) => {
            warn!("Fill pass returned no activities, keeping the initial answer");
            unchanged(initial)
        }
        Err(_) => {
            debug!("Fill pass returned invalid JSON, keeping the initial answer");
            unchanged(initial)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::testing::{fixtures, MockChatClient};
    use serde_json::json;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_llm_json() {
        let raw = parse_llm_json(&fixtures::llm_content()).unwrap();
        assert_eq!(raw.activities.len(), 3);

        let fenced = format!("```json\n{}\n```", fixtures::llm_content());
        assert_eq!(parse_llm_json(&fenced).unwrap().activities.len(), 3);

        assert!(matches!(
            parse_llm_json("Voici mes suggestions"),
            Err(SuggestError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_complete_activities_have_no_missing_fields() {
        let raw = parse_llm_json(&fixtures::llm_content()).unwrap();
        assert!(find_missing_fields(&raw.activities).is_empty());
        assert!(!has_missing_fields(&raw.activities));
    }

    #[test]
    fn test_null_and_absent_fields_are_missing() {
        let mut first = fixtures::activity_json("act_01", "Louvre");
        first["description"] = Value::Null;
        let mut second = fixtures::activity_json("act_02", "Orsay");
        second.as_object_mut().unwrap().remove("tags");

        let missing = find_missing_fields(&[first, second]);
        assert_eq!(
            missing,
            vec![
                MissingField {
                    activity: 0,
                    field: "description"
                },
                MissingField {
                    activity: 1,
                    field: "tags"
                },
            ]
        );
    }

    #[test]
    fn test_incomplete_location_is_missing() {
        let mut empty_address = fixtures::activity_json("act_01", "Louvre");
        empty_address["location"]["address"] = json!("");
        let mut null_lat = fixtures::activity_json("act_02", "Orsay");
        null_lat["location"]["lat"] = Value::Null;
        let mut no_location = fixtures::activity_json("act_03", "Pompidou");
        no_location["location"] = Value::Null;

        let missing = find_missing_fields(&[empty_address, null_lat, no_location]);
        assert_eq!(missing.len(), 3);
        assert!(missing.iter().all(|m| m.field == "location"));
    }

    fn incomplete() -> RawSuggestResponse {
        let mut activity = fixtures::activity_json("act_01", "Louvre");
        activity["price_eur"] = Value::Null;
        RawSuggestResponse {
            activities: vec![activity],
            note: Some(json!(6)),
            note_reasons: Some("prix inconnu".to_string()),
        }
    }

    #[tokio::test]
    async fn test_fill_replaces_response() {
        let client = MockChatClient::new();
        client.push_content(&fixtures::llm_content()).await;

        let conversation = Conversation::new(&client, "gpt-test");
        let outcome = fill_missing_fields(&conversation, incomplete()).await;

        assert!(outcome.repaired);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.response.activities.len(), 3);

        let prompt = client.requests().await[0].messages[0].content.clone().unwrap();
        assert!(prompt.contains("\"price_eur\": null"));
    }

    #[tokio::test]
    async fn test_fill_keeps_initial_on_invalid_json() {
        let client = MockChatClient::new();
        client.push_content("désolé").await;

        let conversation = Conversation::new(&client, "gpt-test");
        let outcome = fill_missing_fields(&conversation, incomplete()).await;

        assert!(!outcome.repaired);
        assert_eq!(outcome.response.activities.len(), 1);
        assert!(outcome.response.activities[0]["price_eur"].is_null());
    }

    #[tokio::test]
    async fn test_fill_keeps_initial_on_llm_error() {
        let client = MockChatClient::new();
        client.fail_next(LlmError::Http("connection reset".to_string())).await;

        let conversation = Conversation::new(&client, "gpt-test");
        let outcome = fill_missing_fields(&conversation, incomplete()).await;

        assert!(!outcome.repaired);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.response.note_reasons.as_deref(), Some("prix inconnu"));
    }

    #[tokio::test]
    async fn test_fill_keeps_initial_on_empty_activities() {
        let client = MockChatClient::new();
        client.push_content(r#"{"activities": [], "note": 5}"#).await;

        let conversation = Conversation::new(&client, "gpt-test");
        let outcome = fill_missing_fields(&conversation, incomplete()).await;
        assert!(!outcome.repaired);
        assert_eq!(outcome.response.activities.len(), 1);
    }
}
