//! Multi-turn tool-calling conversation with the model.
//!
//! The model may call a `web_search` tool any number of times before
//! answering. Searches are simulated: each call gets a canned results message
//! so the model can keep going. The loop ends at the first assistant turn
//! with non-empty content, or fails after `max_iterations` turns.

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::SuggestError;
use crate::llm::{
    ChatClient, ChatMessage, ChatRequest, FinishReason, LlmUsage, ToolCall, ToolDefinition,
    WEB_SEARCH_TOOL,
};

/// What the conversation is for. Selects the JSON reminder appended to the
/// prompt and the simulated search reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Generate new suggestions.
    Suggest,
    /// Fill the missing fields of a previous answer.
    Fill,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Suggest => "suggest",
            Purpose::Fill => "fill",
        }
    }

    fn json_reminder(&self) -> &'static str {
        match self {
            Purpose::Suggest => {
                "Réponds-moi avec un objet JSON bien formaté selon la structure demandée."
            }
            Purpose::Fill => "Réponds-moi avec un objet JSON bien formaté.",
        }
    }

    /// Simulated `web_search` result for `query`.
    pub fn search_reply(&self, query: &str) -> String {
        match self {
            Purpose::Suggest => format!(
                "Résultats de recherche pour \"{}\". Voici plusieurs activités extérieures à Paris \
                 correspondant à vos critères: 1) Les jardins du Luxembourg - entrée gratuite, \
                 2) Marché alimentaire de Bastille - gratuit à explorer, 3) Street-art à Belleville \
                 - balade gratuite, 4) Parc des Buttes-Chaumont - entrée gratuite, 5) Canal \
                 Saint-Martin - promenade gratuite.",
                query
            ),
            Purpose::Fill => format!(
                "Résultats de recherche pour \"{}\". Voici des informations complémentaires qui \
                 pourraient aider à compléter les champs manquants: détails sur les horaires \
                 d'ouverture, prix, avis, coordonnées GPS, etc.",
                query
            ),
        }
    }
}

pub const UNPARSEABLE_QUERY_REPLY: &str = "Error: Unable to parse search query";

/// Result of a finished conversation.
#[derive(Debug, Clone)]
pub struct ConversationOutcome {
    /// Final assistant content
    pub content: String,
    /// Model turns used, including the final one
    pub iterations: u32,
    pub usage: LlmUsage,
}

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
}

/// Conversation settings shared by the suggestion and fill passes.
pub struct Conversation<'a> {
    client: &'a dyn ChatClient,
    model: &'a str,
    temperature: Option<f32>,
    max_iterations: u32,
}

impl<'a> Conversation<'a> {
    pub fn new(client: &'a dyn ChatClient, model: &'a str) -> Self {
        Self {
            client,
            model,
            temperature: None,
            max_iterations: 5,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn model(&self) -> &str {
        self.model
    }

    /// Run the conversation until the model answers with content.
    pub async fn run(
        &self,
        prompt: &str,
        purpose: Purpose,
    ) -> Result<ConversationOutcome, SuggestError> {
        let mut messages = vec![ChatMessage::user(format!(
            "{}\n\n{}",
            prompt,
            purpose.json_reminder()
        ))];
        let mut usage = LlmUsage::default();

        for iteration in 1..=self.max_iterations {
            debug!(
                purpose = purpose.as_str(),
                iteration,
                messages = messages.len(),
                "Conversation turn"
            );

            let request = ChatRequest::new(self.model, messages.clone())
                .with_tools(vec![ToolDefinition::web_search()])
                .with_json_mode()
                .with_temperature(self.temperature);

            let response = self.client.chat(request).await?;
            usage.add(response.usage);

            let message = response.message;
            messages.push(message.clone());

            if response.finish_reason == FinishReason::ToolCalls && !message.tool_calls.is_empty() {
                debug!(
                    purpose = purpose.as_str(),
                    tool_calls = message.tool_calls.len(),
                    "Tool calls requested"
                );
                for call in &message.tool_calls {
                    messages.push(answer_tool_call(call, purpose));
                }
                continue;
            }

            if let Some(content) = message.text() {
                info!(
                    purpose = purpose.as_str(),
                    iteration,
                    chars = content.len(),
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "Final answer received"
                );
                return Ok(ConversationOutcome {
                    content: content.to_string(),
                    iterations: iteration,
                    usage,
                });
            }

            warn!(
                purpose = purpose.as_str(),
                iteration,
                finish_reason = ?response.finish_reason,
                "Turn had neither content nor tool calls"
            );
        }

        warn!(
            purpose = purpose.as_str(),
            max_iterations = self.max_iterations,
            "No final answer within the iteration limit"
        );
        Err(SuggestError::NoFinalContent {
            iterations: self.max_iterations,
        })
    }
}

/// Every tool call gets exactly one tool message so the transcript stays
/// acceptable to the API.
fn answer_tool_call(call: &ToolCall, purpose: Purpose) -> ChatMessage {
    if call.function.name != WEB_SEARCH_TOOL {
        warn!(tool = %call.function.name, "Unknown tool call");
        return ChatMessage::tool(
            &call.id,
            format!("Error: unknown tool '{}'", call.function.name),
        );
    }

    match serde_json::from_str::<WebSearchArgs>(&call.function.arguments) {
        Ok(args) => {
            debug!(query = %args.query, "Simulated web search");
            ChatMessage::tool(&call.id, purpose.search_reply(&args.query))
        }
        Err(e) => {
            warn!(error = %e, arguments = %call.function.arguments, "Unparseable web_search arguments");
            ChatMessage::tool(&call.id, UNPARSEABLE_QUERY_REPLY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, Role};
    use crate::testing::MockChatClient;

    #[tokio::test]
    async fn test_direct_answer() {
        let client = MockChatClient::new();
        client.push_content(r#"{"activities": []}"#).await;

        let outcome = Conversation::new(&client, "gpt-test")
            .run("prompt", Purpose::Suggest)
            .await
            .unwrap();

        assert_eq!(outcome.content, r#"{"activities": []}"#);
        assert_eq!(outcome.iterations, 1);

        let requests = client.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-test");
        assert!(requests[0].json_mode);
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[0].tools[0].function.name, WEB_SEARCH_TOOL);
        assert_eq!(
            requests[0].messages[0].content.as_deref(),
            Some("prompt\n\nRéponds-moi avec un objet JSON bien formaté selon la structure demandée.")
        );
    }

    #[tokio::test]
    async fn test_tool_calls_are_answered() {
        let client = MockChatClient::new();
        client
            .push_tool_calls(vec![
                ToolCall::function("call_1", WEB_SEARCH_TOOL, r#"{"query":"parcs Paris"}"#),
                ToolCall::function("call_2", WEB_SEARCH_TOOL, "not json"),
                ToolCall::function("call_3", "book_table", "{}"),
            ])
            .await;
        client.push_content("{}").await;

        let outcome = Conversation::new(&client, "gpt-test")
            .with_temperature(Some(0.7))
            .run("prompt", Purpose::Suggest)
            .await
            .unwrap();
        assert_eq!(outcome.iterations, 2);

        let requests = client.requests().await;
        assert_eq!(requests[1].temperature, Some(0.7));

        // user, assistant with calls, one reply per call
        let transcript = &requests[1].messages;
        assert_eq!(transcript.len(), 5);
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].tool_calls.len(), 3);

        assert_eq!(transcript[2].role, Role::Tool);
        assert_eq!(transcript[2].tool_call_id.as_deref(), Some("call_1"));
        assert!(transcript[2]
            .content
            .as_deref()
            .unwrap()
            .starts_with("Résultats de recherche pour \"parcs Paris\". Voici plusieurs activités"));

        assert_eq!(transcript[3].content.as_deref(), Some(UNPARSEABLE_QUERY_REPLY));
        assert_eq!(transcript[4].tool_call_id.as_deref(), Some("call_3"));
        assert!(transcript[4].content.as_deref().unwrap().contains("unknown tool"));
    }

    #[tokio::test]
    async fn test_fill_purpose_uses_fill_reply() {
        let client = MockChatClient::new();
        client
            .push_tool_calls(vec![ToolCall::function(
                "call_1",
                WEB_SEARCH_TOOL,
                r#"{"query":"horaires Louvre"}"#,
            )])
            .await;
        client.push_content("{}").await;

        Conversation::new(&client, "gpt-test")
            .run("fill", Purpose::Fill)
            .await
            .unwrap();

        let requests = client.requests().await;
        assert!(requests[0].messages[0]
            .content
            .as_deref()
            .unwrap()
            .ends_with("Réponds-moi avec un objet JSON bien formaté."));
        assert!(requests[1].messages[2]
            .content
            .as_deref()
            .unwrap()
            .contains("informations complémentaires"));
    }

    #[tokio::test]
    async fn test_empty_turns_exhaust_iterations() {
        let client = MockChatClient::new();
        for _ in 0..3 {
            client.push_empty().await;
        }

        let result = Conversation::new(&client, "gpt-test")
            .with_max_iterations(3)
            .run("prompt", Purpose::Suggest)
            .await;

        assert!(matches!(
            result,
            Err(SuggestError::NoFinalContent { iterations: 3 })
        ));
        assert_eq!(client.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_empty_turn_then_answer() {
        let client = MockChatClient::new();
        client.push_empty().await;
        client.push_content("{\"note\": 5}").await;

        let outcome = Conversation::new(&client, "gpt-test")
            .run("prompt", Purpose::Suggest)
            .await
            .unwrap();
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.usage.input_tokens, 20);
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let client = MockChatClient::new();
        client
            .fail_next(LlmError::Api {
                status: 429,
                message: "rate limited".to_string(),
            })
            .await;

        let result = Conversation::new(&client, "gpt-test")
            .run("prompt", Purpose::Suggest)
            .await;
        assert!(matches!(result, Err(SuggestError::Llm(LlmError::Api { status: 429, .. }))));
    }
}
