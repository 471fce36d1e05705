use queueline_core::{BoardConfig, Config, QueueEngine, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: QueueEngine,
}

impl AppState {
    pub fn new(config: Config, engine: QueueEngine) -> Self {
        Self { config, engine }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn board_config(&self) -> &BoardConfig {
        &self.config.board
    }

    pub fn engine(&self) -> &QueueEngine {
        &self.engine
    }
}
