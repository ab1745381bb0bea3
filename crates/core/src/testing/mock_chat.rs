//! Mock chat client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::llm::{
    ChatClient, ChatMessage, ChatRequest, ChatResponse, FinishReason, LlmError, LlmUsage, Role,
    ToolCall,
};

/// Mock implementation of the ChatClient trait.
///
/// Responses are scripted in order; every request is recorded. When the
/// script runs out, `chat` fails with `LlmError::EmptyResponse`.
///
/// # Example
///
/// ```rust,ignore
/// use where2_core::testing::MockChatClient;
///
/// let client = MockChatClient::new();
/// client.push_tool_calls(vec![ToolCall::function("c1", "web_search", r#"{"query":"parcs"}"#)]).await;
/// client.push_content(r#"{"activities": []}"#).await;
///
/// // run a conversation...
/// assert_eq!(client.request_count().await, 2);
/// ```
#[derive(Debug, Default)]
pub struct MockChatClient {
    /// Scripted responses, consumed front to back.
    responses: Arc<RwLock<VecDeque<ChatResponse>>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<ChatRequest>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<LlmError>>>,
}

/// Token usage reported for every scripted turn.
pub const MOCK_TURN_USAGE: LlmUsage = LlmUsage {
    input_tokens: 10,
    output_tokens: 5,
};

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub async fn push_response(&self, response: ChatResponse) {
        self.responses.write().await.push_back(response);
    }

    /// Queue a final assistant answer.
    pub async fn push_content(&self, content: &str) {
        self.push_response(Self::response(
            ChatMessage::assistant(content),
            FinishReason::Stop,
        ))
        .await;
    }

    /// Queue an assistant turn requesting tool calls.
    pub async fn push_tool_calls(&self, tool_calls: Vec<ToolCall>) {
        let message = ChatMessage {
            role: Role::Assistant,
            content: None,
            tool_calls,
            tool_call_id: None,
        };
        self.push_response(Self::response(message, FinishReason::ToolCalls))
            .await;
    }

    /// Queue a turn with neither content nor tool calls.
    pub async fn push_empty(&self) {
        let message = ChatMessage {
            role: Role::Assistant,
            content: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        };
        self.push_response(Self::response(message, FinishReason::Stop))
            .await;
    }

    /// Configure the next call to fail with the given error.
    pub async fn fail_next(&self, error: LlmError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    fn response(message: ChatMessage, finish_reason: FinishReason) -> ChatResponse {
        ChatResponse {
            message,
            finish_reason,
            usage: MOCK_TURN_USAGE,
            model: "mock-model".to_string(),
        }
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    fn provider(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.write().await.push(request);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.responses
            .write()
            .await
            .pop_front()
            .ok_or(LlmError::EmptyResponse)
    }
}
