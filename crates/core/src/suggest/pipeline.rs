use chrono::Local;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::conversation::{Conversation, Purpose};
use super::enrich::Enricher;
use super::prompt::{build_prompt, PromptContext};
use super::repair::{fill_missing_fields, find_missing_fields, parse_llm_json};
use super::SuggestError;
use crate::activity::{validate_response, SuggestRequest, SuggestResponse};
use crate::config::{OpenAiConfig, SuggestConfig};
use crate::datetime::datetime_info;
use crate::llm::{ChatClient, LlmUsage};
use crate::store::ActivityStore;
use crate::weather::WeatherProvider;

/// Model selection for one run.
#[derive(Debug, Clone, Default)]
pub struct SuggestOptions {
    /// Overrides the configured default model
    pub model: Option<String>,
    /// Reasoning models reject a temperature; none is sent when set.
    pub reasoning: bool,
}

impl SuggestOptions {
    pub fn reasoning(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            reasoning: true,
        }
    }
}

/// Counters collected during one run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub request_id: String,
    pub model: String,
    /// Turns of the suggestion conversation
    pub iterations: u32,
    /// Turns of the fill conversation, 0 when it did not run
    pub fill_iterations: u32,
    pub missing_fields: usize,
    pub repaired: bool,
    /// Activities dropped because they could not be typed
    pub dropped_activities: usize,
    pub usage: LlmUsage,
    pub duration: Duration,
}

/// A successful run.
#[derive(Debug, Clone)]
pub struct SuggestRun {
    pub response: SuggestResponse,
    pub stats: RunStats,
}

/// Weather, prompt, conversation, repair, enrichment, storage, validation.
pub struct SuggestionPipeline {
    chat: Arc<dyn ChatClient>,
    weather: Arc<dyn WeatherProvider>,
    enricher: Enricher,
    store: Arc<ActivityStore>,
    openai: OpenAiConfig,
    defaults: SuggestConfig,
}

impl SuggestionPipeline {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        weather: Arc<dyn WeatherProvider>,
        enricher: Enricher,
        store: Arc<ActivityStore>,
        openai: OpenAiConfig,
        defaults: SuggestConfig,
    ) -> Self {
        Self {
            chat,
            weather,
            enricher,
            store,
            openai,
            defaults,
        }
    }

    pub fn store(&self) -> &Arc<ActivityStore> {
        &self.store
    }

    pub fn reasoning_model(&self) -> &str {
        &self.openai.reasoning_model
    }

    /// Run the whole pipeline for one request.
    pub async fn suggest(
        &self,
        request: SuggestRequest,
        options: SuggestOptions,
    ) -> Result<SuggestRun, SuggestError> {
        let request_id = Uuid::new_v4().to_string();
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.openai.model.clone());
        let span = info_span!("suggest", request_id = %request_id, model = %model);

        self.run(request, options, request_id, model)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        request: SuggestRequest,
        options: SuggestOptions,
        request_id: String,
        model: String,
    ) -> Result<SuggestRun, SuggestError> {
        let started = Instant::now();
        let mut stats = RunStats {
            request_id,
            model: model.clone(),
            ..Default::default()
        };

        let answers = request.answers.with_defaults(&self.defaults);
        let location = request.location;

        let weather = self.weather.current(location.lat, location.lng).await?;
        let datetime = datetime_info(request.datetime.as_deref(), Local::now().naive_local());
        info!(
            weather = %weather.description,
            date = %datetime.date,
            time = %datetime.time,
            "Context ready"
        );

        let exclude_ids = request.exclude_ids.unwrap_or_default();
        let prompt = build_prompt(&PromptContext {
            answers: &answers,
            location,
            weather: &weather,
            datetime: &datetime,
            refine: request.refine.unwrap_or(false),
            exclude_ids: &exclude_ids,
        });

        let temperature = if options.reasoning {
            None
        } else {
            self.openai.temperature
        };
        let conversation = Conversation::new(self.chat.as_ref(), &model)
            .with_temperature(temperature)
            .with_max_iterations(self.openai.max_iterations);

        let outcome = conversation.run(&prompt, Purpose::Suggest).await?;
        stats.iterations = outcome.iterations;
        stats.usage.add(outcome.usage);

        let mut raw = parse_llm_json(&outcome.content)?;
        let missing = find_missing_fields(&raw.activities);
        stats.missing_fields = missing.len();
        if !missing.is_empty() {
            info!(missing = missing.len(), "Answer has missing fields, running fill pass");
            let repair = fill_missing_fields(&conversation, raw).await;
            stats.fill_iterations = repair.iterations;
            stats.repaired = repair.repaired;
            stats.usage.add(repair.usage);
            raw = repair.response;
        }

        let received = raw.activities.len();
        let mut response = raw.into_typed();
        stats.dropped_activities = received - response.activities.len();
        if response.activities.is_empty() {
            warn!(received, "No usable activity in the answer");
            return Err(SuggestError::InvalidResponse(validate_response(&response)));
        }

        response.activities = self
            .enricher
            .enrich(response.activities, location)
            .await;

        self.store.insert_all(response.activities.iter().cloned()).await;

        let violations = validate_response(&response);
        if !violations.is_empty() {
            warn!(violations = violations.len(), "Final response failed validation");
            return Err(SuggestError::InvalidResponse(violations));
        }

        stats.duration = started.elapsed();
        info!(
            activities = response.activities.len(),
            note = response.note,
            iterations = stats.iterations,
            repaired = stats.repaired,
            elapsed_ms = stats.duration.as_millis() as u64,
            "Suggestions ready"
        );

        Ok(SuggestRun { response, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::TravelType;
    use crate::images::ImageFinder;
    use crate::maps::{RouteLeg, TravelMode};
    use crate::testing::{fixtures, MockChatClient, MockMaps, MockWeather};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    struct Harness {
        chat: Arc<MockChatClient>,
        weather: Arc<MockWeather>,
        maps: Arc<MockMaps>,
        pipeline: SuggestionPipeline,
    }

    async fn harness() -> Harness {
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

        let enricher = Enricher::new(
            maps.clone(),
            Arc::new(ImageFinder::new("https://placeholder")),
        );
        let openai = OpenAiConfig {
            temperature: Some(0.7),
            ..Default::default()
        };
        let pipeline = SuggestionPipeline::new(
            chat.clone(),
            weather.clone(),
            enricher,
            Arc::new(ActivityStore::new()),
            openai,
            SuggestConfig::default(),
        );

        Harness {
            chat,
            weather,
            maps,
            pipeline,
        }
    }

    fn request() -> SuggestRequest {
        serde_json::from_value(json!({
            "answers": { "canceled_activity": "Cinéma", "same_type": true },
            "location": { "lat": 48.8566, "lng": 2.3522 },
            "datetime": "2025-05-01T10:00:00"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_happy_path() {
        let h = harness().await;
        h.chat.push_content(&fixtures::llm_content()).await;

        let run = assert_ok!(
            h.pipeline
                .suggest(request(), SuggestOptions::default())
                .await
        );

        assert_eq!(run.response.activities.len(), 3);
        assert_eq!(run.stats.iterations, 1);
        assert!(!run.stats.repaired);
        assert_eq!(run.stats.model, "gpt-4.1");
        assert!(!run.stats.request_id.is_empty());

        let first = &run.response.activities[0];
        assert_eq!(first.travel_type, Some(TravelType::Walking));
        assert_eq!(first.distance_m, Some(1200));
        assert_eq!(first.image_url.as_deref(), Some("https://placeholder"));

        let stored = h.pipeline.store().get(&first.id).await.unwrap();
        assert_eq!(&stored, first);
        assert_eq!(h.weather.call_count().await, 1);

        let requests = h.chat.requests().await;
        assert_eq!(requests[0].model, "gpt-4.1");
        assert_eq!(requests[0].temperature, Some(0.7));
        let prompt = requests[0].messages[0].content.clone().unwrap();
        assert!(prompt.contains("Mon budget maximum est de 50 euros."));
        assert!(prompt.contains("C'est un jour férié."));
    }

    #[tokio::test]
    async fn test_reasoning_model_sends_no_temperature() {
        let h = harness().await;
        h.chat.push_content(&fixtures::llm_content()).await;

        let run = h
            .pipeline
            .suggest(request(), SuggestOptions::reasoning("o3"))
            .await
            .unwrap();

        assert_eq!(run.stats.model, "o3");
        let requests = h.chat.requests().await;
        assert_eq!(requests[0].model, "o3");
        assert_eq!(requests[0].temperature, None);
    }

    #[tokio::test]
    async fn test_missing_fields_trigger_fill_pass() {
        let h = harness().await;
        let mut incomplete: serde_json::Value =
            serde_json::from_str(&fixtures::llm_content()).unwrap();
        incomplete["activities"][1]["tags"] = serde_json::Value::Null;
        h.chat.push_content(&incomplete.to_string()).await;
        h.chat.push_content(&fixtures::llm_content()).await;

        let run = h
            .pipeline
            .suggest(request(), SuggestOptions::default())
            .await
            .unwrap();

        assert_eq!(run.stats.missing_fields, 1);
        assert!(run.stats.repaired);
        assert_eq!(run.stats.fill_iterations, 1);
        assert_eq!(h.chat.request_count().await, 2);
        assert_eq!(run.response.activities.len(), 3);
    }

    #[tokio::test]
    async fn test_untypeable_activity_is_dropped() {
        let h = harness().await;
        let mut content: serde_json::Value =
            serde_json::from_str(&fixtures::llm_content()).unwrap();
        content["activities"][2]["tags"] = json!(null);
        h.chat.push_content(&content.to_string()).await;
        // fill pass fails: the incomplete answer is typed as-is
        h.chat.push_content("pas du json").await;

        let run = h
            .pipeline
            .suggest(request(), SuggestOptions::default())
            .await
            .unwrap();

        assert!(!run.stats.repaired);
        assert_eq!(run.stats.dropped_activities, 1);
        assert_eq!(run.response.activities.len(), 2);
    }

    #[tokio::test]
    async fn test_weather_failure() {
        let h = harness().await;
        h.weather.fail_with("service unavailable").await;

        let error = assert_err!(h.pipeline.suggest(request(), SuggestOptions::default()).await);
        assert!(matches!(error, SuggestError::Weather(_)));
        assert_eq!(h.chat.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let h = harness().await;
        h.chat.push_content("Voici trois idées...").await;

        let result = h.pipeline.suggest(request(), SuggestOptions::default()).await;
        assert!(matches!(result, Err(SuggestError::InvalidJson(_))));
    }

    #[tokio::test]
    async fn test_invalid_note_is_rejected_after_storing() {
        let h = harness().await;
        let mut content: serde_json::Value =
            serde_json::from_str(&fixtures::llm_content()).unwrap();
        content["note"] = json!(42);
        h.chat.push_content(&content.to_string()).await;

        let result = h.pipeline.suggest(request(), SuggestOptions::default()).await;
        match result {
            Err(SuggestError::InvalidResponse(violations)) => {
                assert_eq!(violations[0].path, "note");
            }
            other => panic!("expected InvalidResponse, got {:?}", other),
        }
        assert_eq!(h.pipeline.store().len().await, 3);
        assert!(h.maps.directions_count(TravelMode::Walking).await >= 3);
    }

    #[tokio::test]
    async fn test_no_activities_is_invalid() {
        let h = harness().await;
        h.chat
            .push_content(r#"{"activities": [], "note": 5, "note_reasons": "rien"}"#)
            .await;

        let result = h.pipeline.suggest(request(), SuggestOptions::default()).await;
        assert!(matches!(result, Err(SuggestError::InvalidResponse(_))));
    }
}
