pub mod activity;
pub mod config;
pub mod datetime;
pub mod images;
pub mod llm;
pub mod maps;
pub mod store;
pub mod suggest;
pub mod testing;
pub mod weather;

pub use activity::{Activity, Answers, Coordinates, SuggestRequest, SuggestResponse};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use store::ActivityStore;
pub use suggest::{SuggestError, SuggestOptions, SuggestRun, SuggestionPipeline};
