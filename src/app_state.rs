use std::sync::Arc;

use crate::{
    config::Config,
    errors::AppResult,
    services::{
        generation_service::GenerationService,
        model_service::{build_model_client, ModelClient},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub generation_service: Arc<GenerationService>,
    pub model_label: String,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let client = build_model_client(&config.model)?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: Config, client: Arc<dyn ModelClient>) -> Self {
        let model_label = client.describe();
        let generation_service =
            Arc::new(GenerationService::new(client, config.generation.clone()));

        Self {
            generation_service,
            model_label,
            config: Arc::new(config),
        }
    }
}
