//! Suggestion endpoints and the activity lookup.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use where2_core::{
    activity::sample_response, Activity, SuggestOptions, SuggestRequest, SuggestResponse,
};

use super::error::ApiError;
use crate::metrics::{self, ACTIVITIES_STORED};
use crate::state::AppState;

/// POST /suggest
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SuggestRequest>, JsonRejection>,
) -> Result<Json<SuggestResponse>, ApiError> {
    run(&state, "/suggest", body, SuggestOptions::default()).await
}

/// POST /suggest-o3
///
/// Same pipeline, answered by the configured reasoning model.
pub async fn suggest_o3(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SuggestRequest>, JsonRejection>,
) -> Result<Json<SuggestResponse>, ApiError> {
    let options = SuggestOptions::reasoning(state.pipeline().reasoning_model());
    run(&state, "/suggest-o3", body, options).await
}

async fn run(
    state: &AppState,
    endpoint: &str,
    body: Result<Json<SuggestRequest>, JsonRejection>,
    options: SuggestOptions,
) -> Result<Json<SuggestResponse>, ApiError> {
    let Json(request) = body.inspect_err(|_| metrics::record_failure(endpoint, "bad_request"))?;

    match state.pipeline().suggest(request, options).await {
        Ok(run) => {
            metrics::record_run(endpoint, &run.stats);
            ACTIVITIES_STORED.set(state.store().len().await as i64);
            Ok(Json(run.response))
        }
        Err(e) => {
            error!(endpoint, kind = e.kind(), error = %e, "Suggestion failed");
            metrics::record_failure(endpoint, e.kind());
            // invalid responses are stored before validation
            ACTIVITIES_STORED.set(state.store().len().await as i64);
            Err(e.into())
        }
    }
}

/// GET /activity/{id}
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Activity>, ApiError> {
    state
        .store()
        .get(&id)
        .await
        .map(Json)
        .ok_or(ApiError::ActivityNotFound)
}

/// POST /mock-delay
///
/// Canned answer after a configurable delay, for client loading states.
pub async fn mock_delay(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SuggestRequest>, JsonRejection>,
) -> Result<Json<SuggestResponse>, ApiError> {
    let Json(_request) = body?;
    let delay = Duration::from_millis(state.config().suggest.mock_delay_ms);
    info!(delay_ms = delay.as_millis() as u64, "Serving mock suggestions");
    tokio::time::sleep(delay).await;
    Ok(Json(sample_response()))
}
