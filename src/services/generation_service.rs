use std::sync::Arc;

use crate::{
    config::GenerationSettings,
    errors::AppResult,
    models::{
        domain::{BatchReport, GenerationResult},
        dto::request::{into_batch_requests, GenerateMcqRequestDto},
    },
    services::{
        batch_coordinator::BatchCoordinator, chain_orchestrator::ChainOrchestrator,
        model_service::ModelClient,
    },
};

/// Entry point for callers. Every request is checked against the configured bounds
/// before a single model call is made.
pub struct GenerationService {
    orchestrator: Arc<ChainOrchestrator>,
    batch_coordinator: BatchCoordinator,
    settings: GenerationSettings,
}

impl GenerationService {
    pub fn new(client: Arc<dyn ModelClient>, settings: GenerationSettings) -> Self {
        let orchestrator = Arc::new(ChainOrchestrator::new(client, &settings));
        Self {
            batch_coordinator: BatchCoordinator::new(orchestrator.clone()),
            orchestrator,
            settings,
        }
    }

    pub async fn generate(&self, dto: GenerateMcqRequestDto) -> AppResult<GenerationResult> {
        let request = dto.into_request(&self.settings)?;
        Ok(self.orchestrator.generate(request).await)
    }

    pub async fn generate_batch(
        &self,
        dtos: Vec<GenerateMcqRequestDto>,
    ) -> AppResult<BatchReport> {
        let requests = into_batch_requests(dtos, &self.settings)?;
        Ok(self
            .batch_coordinator
            .run_batch(requests, self.settings.batch_concurrency_limit)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        errors::AppError,
        models::domain::{Difficulty, GenerationStatus},
        services::model_service::MockModelClient,
        test_utils::ScriptedModelClient,
    };

    fn dto(topic: &str, question_count: Option<i64>) -> GenerateMcqRequestDto {
        GenerateMcqRequestDto {
            username: "john_doe".to_string(),
            topic: topic.to_string(),
            difficulty: Difficulty::Basic,
            question_count,
            include_roadmap: true,
            include_videos: false,
        }
    }

    #[tokio::test]
    async fn out_of_range_count_is_rejected_before_any_model_call() {
        let mut mock = MockModelClient::new();
        mock.expect_complete().times(0);
        let service = GenerationService::new(Arc::new(mock), Config::test_config().generation);

        let err = service.generate(dto("Linked Lists", Some(51))).await.unwrap_err();
        assert!(matches!(err, AppError::InputError(_)));
    }

    #[tokio::test]
    async fn invalid_batch_member_rejects_whole_batch() {
        let mut mock = MockModelClient::new();
        mock.expect_complete().times(0);
        let service = GenerationService::new(Arc::new(mock), Config::test_config().generation);

        let result = service
            .generate_batch(vec![dto("Linked Lists", Some(5)), dto("x", Some(5))])
            .await;
        assert!(matches!(result, Err(AppError::InputError(_))));
    }

    #[tokio::test]
    async fn valid_request_runs_pipeline() {
        let client = ScriptedModelClient::valid();
        let service =
            GenerationService::new(Arc::new(client.clone()), Config::test_config().generation);

        let result = service
            .generate(dto("Linked Lists", Some(5)))
            .await
            .expect("valid input");

        assert_eq!(result.status, GenerationStatus::Success);
        assert_eq!(result.roadmap.as_ref().map(|r| r.len()), Some(3));
        assert!(result.reference_videos.is_none());
    }
}
