use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers, middleware::metrics_middleware, suggest};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(3600));

    Router::new()
        // Health, config and metrics
        .route("/healthz", get(handlers::healthz))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Suggestions
        .route("/suggest", post(suggest::suggest))
        .route("/suggest-o3", post(suggest::suggest_o3))
        .route("/mock-delay", post(suggest::mock_delay))
        .route("/activity/{id}", get(suggest::get_activity))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
