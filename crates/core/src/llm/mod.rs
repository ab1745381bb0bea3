//! Chat-completions client with tool calling.

mod openai;
mod types;

pub use openai::OpenAiClient;
pub use types::*;

use async_trait::async_trait;
use std::time::Duration;

/// Error type for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Not configured")]
    NotConfigured,

    #[error("Response contained no choices")]
    EmptyResponse,
}

/// Trait for chat-completion clients.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Provider name (e.g., "openai")
    fn provider(&self) -> &str;

    /// Send the transcript and get the next assistant turn.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;
}
