use thiserror::Error;

use crate::activity::FieldViolation;
use crate::llm::LlmError;
use crate::weather::WeatherError;

/// Error type for a suggestion run.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Weather lookup failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("No final answer from the model after {iterations} iterations")]
    NoFinalContent { iterations: u32 },

    #[error("Invalid JSON from the model: {0}")]
    InvalidJson(String),

    #[error("Response failed validation ({} violations)", .0.len())]
    InvalidResponse(Vec<FieldViolation>),
}

impl SuggestError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SuggestError::Weather(_) => "weather",
            SuggestError::Llm(_) => "llm",
            SuggestError::NoFinalContent { .. } => "no_final_content",
            SuggestError::InvalidJson(_) => "invalid_json",
            SuggestError::InvalidResponse(_) => "invalid_response",
        }
    }

    /// Whether the failure happened while generating suggestions with the model.
    pub fn is_generation(&self) -> bool {
        matches!(
            self,
            SuggestError::Llm(_) | SuggestError::NoFinalContent { .. } | SuggestError::InvalidJson(_)
        )
    }
}
