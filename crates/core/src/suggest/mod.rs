//! Activity suggestion: prompt, tool-calling conversation, JSON repair and
//! enrichment.

mod conversation;
mod enrich;
mod error;
mod pipeline;
mod prompt;
mod repair;

pub use conversation::{Conversation, ConversationOutcome, Purpose, UNPARSEABLE_QUERY_REPLY};
pub use enrich::Enricher;
pub use error::SuggestError;
pub use pipeline::{RunStats, SuggestOptions, SuggestRun, SuggestionPipeline};
pub use prompt::{build_fill_prompt, build_prompt, PromptContext};
pub use repair::{
    fill_missing_fields, find_missing_fields, has_missing_fields, parse_llm_json,
    strip_code_fences, MissingField, RepairOutcome, IMPORTANT_FIELDS,
};
