//! Error responses of the HTTP API.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use where2_core::SuggestError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub enum ApiError {
    /// Body could not be read as a suggestion request
    InvalidRequest(String),
    Suggest(SuggestError),
    ActivityNotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Suggest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ActivityNotFound => StatusCode::NOT_FOUND,
        }
    }

    fn body(self) -> ErrorResponse {
        match self {
            ApiError::InvalidRequest(details) => ErrorResponse {
                error: "Invalid request format".to_string(),
                details: Some(Value::String(details)),
            },
            ApiError::Suggest(SuggestError::Weather(e)) => ErrorResponse {
                error: "Failed to fetch weather data".to_string(),
                details: Some(Value::String(e.to_string())),
            },
            ApiError::Suggest(SuggestError::InvalidResponse(violations)) => ErrorResponse {
                error: "Failed to generate valid suggestions".to_string(),
                details: serde_json::to_value(violations).ok(),
            },
            ApiError::Suggest(e) => ErrorResponse {
                error: "Failed to generate suggestions".to_string(),
                details: Some(Value::String(e.to_string())),
            },
            ApiError::ActivityNotFound => ErrorResponse {
                error: "Activity not found".to_string(),
                details: None,
            },
        }
    }
}

impl From<SuggestError> for ApiError {
    fn from(e: SuggestError) -> Self {
        ApiError::Suggest(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}
