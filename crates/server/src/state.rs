use std::sync::Arc;

use strmkit_core::{Config, ExtractionService, SanitizedConfig, TaskScheduler};

/// Shared application state
pub struct AppState {
    config: Config,
    service: Arc<ExtractionService>,
    scheduler: TaskScheduler,
}

impl AppState {
    pub fn new(config: Config, service: Arc<ExtractionService>, scheduler: TaskScheduler) -> Self {
        Self {
            config,
            service,
            scheduler,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn service(&self) -> &ExtractionService {
        &self.service
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }
}
