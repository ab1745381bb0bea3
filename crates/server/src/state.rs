use std::sync::Arc;
use std::time::Instant;
use where2_core::{ActivityStore, Config, SanitizedConfig, SuggestionPipeline};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: SuggestionPipeline,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, pipeline: SuggestionPipeline) -> Self {
        Self {
            config,
            pipeline,
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> &SuggestionPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &Arc<ActivityStore> {
        self.pipeline.store()
    }

    /// Seconds since the state was built.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
