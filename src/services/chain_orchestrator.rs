use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    config::GenerationSettings,
    errors::TerminalFailure,
    models::domain::{GenerationRequest, GenerationResult, GenerationStatus, UnitError, UnitKind},
    services::{
        model_service::{ModelClient, ModelInvoker},
        orchestrator_steps::generation_steps::create_generation_steps,
        retry_controller::RetryPolicy,
        step_executor::StepHandler,
    },
};

/// One planned generation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStep {
    pub unit: UnitKind,
    pub description: Option<String>,
    pub max_attempts: u32,
}

impl UnitStep {
    pub fn new(unit: UnitKind) -> Self {
        Self {
            unit,
            description: None,
            max_attempts: 3,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Sequences the units for one topic and assembles the result.
///
/// The question unit always runs first and gates everything else. Once it succeeds,
/// roadmap and videos run side by side; their failures degrade the result to partial
/// and never reach the caller as errors. Every unit shares the request's deadline.
pub struct ChainOrchestrator {
    handler: StepHandler,
    max_attempts: u32,
    request_timeout: Duration,
}

impl ChainOrchestrator {
    pub fn new(client: Arc<dyn ModelClient>, settings: &GenerationSettings) -> Self {
        let invoker = ModelInvoker::new(client, settings.model_timeout);
        Self {
            handler: StepHandler::new(invoker, RetryPolicy::from_settings(settings)),
            max_attempts: settings.max_attempts,
            request_timeout: settings.request_timeout,
        }
    }

    pub async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.request_timeout;
        let steps = create_generation_steps(&request, self.max_attempts);
        let step_for = |unit: UnitKind| steps.iter().find(|s| s.unit == unit);

        log::info!(
            "Starting generation for user {} on '{}' ({} questions, {}, {} unit(s))",
            request.username,
            request.topic,
            request.question_count,
            request.difficulty,
            steps.len()
        );

        let mut errors = Vec::new();
        let questions = match step_for(UnitKind::Questions) {
            Some(step) => {
                let outcome = self.handler.handle_questions(step, &request, deadline).await;
                settle(outcome, &mut errors)
            }
            None => None,
        };

        let Some(questions) = questions else {
            let result =
                GenerationResult::finalize(request, None, None, None, errors, started.elapsed());
            log::error!(
                "Generation failed for '{}': question unit did not complete",
                result.request.topic
            );
            return result;
        };

        let roadmap_unit = async {
            match step_for(UnitKind::Roadmap) {
                Some(step) => Some(self.handler.handle_roadmap(step, &request, deadline).await),
                None => None,
            }
        };
        let videos_unit = async {
            match step_for(UnitKind::Videos) {
                Some(step) => Some(
                    self.handler
                        .handle_videos(step, &request, &questions, deadline)
                        .await,
                ),
                None => None,
            }
        };
        let (roadmap_outcome, videos_outcome) = tokio::join!(roadmap_unit, videos_unit);

        let roadmap = roadmap_outcome.and_then(|o| settle(o, &mut errors));
        let videos = videos_outcome.and_then(|o| settle(o, &mut errors));

        let result = GenerationResult::finalize(
            request,
            Some(questions),
            roadmap,
            videos,
            errors,
            started.elapsed(),
        );

        match result.status {
            GenerationStatus::Partial => log::warn!(
                "Generation for '{}' is partial: {}",
                result.request.topic,
                result
                    .errors
                    .iter()
                    .map(|e| e.unit.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            _ => log::info!(
                "Generation for '{}' finished with status {} in {:.2}s",
                result.request.topic,
                result.status,
                result.metadata.generation_time_seconds
            ),
        }

        result
    }
}

fn settle<T>(outcome: Result<T, TerminalFailure>, errors: &mut Vec<UnitError>) -> Option<T> {
    match outcome {
        Ok(record) => Some(record),
        Err(terminal) => {
            errors.push(UnitError::from(terminal));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        errors::TransportReason,
        models::domain::{Difficulty, UnitErrorKind},
        test_utils::{cyclic_roadmap_json, sample_request, ScriptedModelClient},
    };

    fn orchestrator(client: ScriptedModelClient) -> ChainOrchestrator {
        ChainOrchestrator::new(Arc::new(client), &Config::test_config().generation)
    }

    #[tokio::test]
    async fn all_units_succeed() {
        let client = ScriptedModelClient::valid();
        let result = orchestrator(client.clone())
            .generate(sample_request("Linked Lists"))
            .await;

        assert_eq!(result.status, GenerationStatus::Success);
        assert_eq!(result.questions.as_ref().map(|q| q.len()), Some(5));
        assert_eq!(result.roadmap.as_ref().map(|r| r.len()), Some(3));
        assert!(result.reference_videos.is_some());
        assert!(result.errors.is_empty());
        assert_eq!(result.metadata.total_questions, 5);
        assert_eq!(
            result.metadata.difficulty_distribution.get(&Difficulty::Basic),
            Some(&5)
        );
        assert_eq!(client.calls(UnitKind::Questions), 1);
    }

    #[tokio::test]
    async fn excluded_units_are_never_invoked() {
        let client = ScriptedModelClient::valid();
        let mut request = sample_request("Linked Lists");
        request.include_roadmap = false;
        request.include_videos = false;

        let result = orchestrator(client.clone()).generate(request).await;

        assert_eq!(result.status, GenerationStatus::Success);
        assert!(result.roadmap.is_none());
        assert!(result.reference_videos.is_none());
        assert_eq!(client.calls(UnitKind::Roadmap), 0);
        assert_eq!(client.calls(UnitKind::Videos), 0);
    }

    #[tokio::test]
    async fn question_failure_fails_request_and_skips_enhancements() {
        let client = ScriptedModelClient::valid().with_response(UnitKind::Questions, "garbage");
        let result = orchestrator(client.clone())
            .generate(sample_request("Linked Lists"))
            .await;

        assert_eq!(result.status, GenerationStatus::Failed);
        assert!(result.questions.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].unit, UnitKind::Questions);
        assert_eq!(result.errors[0].attempts.len(), 3);
        assert_eq!(client.calls(UnitKind::Roadmap), 0);
        assert_eq!(client.calls(UnitKind::Videos), 0);
    }

    #[tokio::test]
    async fn roadmap_failure_degrades_to_partial() {
        let client =
            ScriptedModelClient::valid().with_response(UnitKind::Roadmap, &cyclic_roadmap_json());
        let result = orchestrator(client).generate(sample_request("Linked Lists")).await;

        assert_eq!(result.status, GenerationStatus::Partial);
        assert!(result.questions.is_some());
        assert!(result.roadmap.is_none());
        assert!(result.reference_videos.is_some());

        let error = result.error_for(UnitKind::Roadmap).expect("roadmap error recorded");
        assert_eq!(error.kind, UnitErrorKind::Exhausted);
        assert!(error.attempts[0].reason.contains("prerequisite_order"));
    }

    #[tokio::test]
    async fn video_failure_is_independent_of_roadmap() {
        let client = ScriptedModelClient::valid().with_response(UnitKind::Videos, "{}");
        let result = orchestrator(client).generate(sample_request("Linked Lists")).await;

        assert_eq!(result.status, GenerationStatus::Partial);
        assert!(result.roadmap.is_some());
        assert!(result.reference_videos.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].unit, UnitKind::Videos);
    }

    #[tokio::test]
    async fn rate_limited_videos_record_transport_history() {
        let client = ScriptedModelClient::valid()
            .with_failure(UnitKind::Videos, TransportReason::RateLimited);
        let result = orchestrator(client.clone())
            .generate(sample_request("Linked Lists"))
            .await;

        assert_eq!(result.status, GenerationStatus::Partial);
        let error = result.error_for(UnitKind::Videos).expect("videos error recorded");
        assert!(error.attempts.iter().all(|a| a.category == "transport"));
        assert!(error.attempts[0].reason.contains("rate_limited"));
        assert_eq!(client.calls(UnitKind::Videos), 3);
    }

    #[tokio::test]
    async fn deadline_abandons_running_units() {
        let client = ScriptedModelClient::valid().with_delay(UnitKind::Roadmap, Duration::from_millis(400));
        let mut settings = Config::test_config().generation;
        settings.request_timeout = Duration::from_millis(150);
        settings.model_timeout = Duration::from_secs(2);

        let result = ChainOrchestrator::new(Arc::new(client), &settings)
            .generate(sample_request("Linked Lists"))
            .await;

        assert_eq!(result.status, GenerationStatus::Partial);
        let error = result.error_for(UnitKind::Roadmap).expect("roadmap timed out");
        assert_eq!(error.kind, UnitErrorKind::Timeout);
        assert_eq!(error.attempts.len(), 1);
        assert!(result.reference_videos.is_some());
    }

    #[tokio::test]
    async fn question_timeout_keeps_attempt_history() {
        let client = ScriptedModelClient::valid()
            .with_response(UnitKind::Questions, "garbage")
            .with_delay(UnitKind::Questions, Duration::from_millis(40));
        let mut settings = Config::test_config().generation;
        settings.request_timeout = Duration::from_millis(150);
        settings.model_timeout = Duration::from_secs(2);
        settings.max_attempts = 10;

        let result = ChainOrchestrator::new(Arc::new(client.clone()), &settings)
            .generate(sample_request("Linked Lists"))
            .await;

        assert_eq!(result.status, GenerationStatus::Failed);
        let error = result.error_for(UnitKind::Questions).expect("questions timed out");
        assert_eq!(error.kind, UnitErrorKind::Timeout);
        assert!(error.attempts.len() >= 2);
        assert_eq!(error.attempts[0].category, "validation");
        assert!(error.attempts[0].reason.contains("parse"));
        assert!(client.calls(UnitKind::Questions) < 10);
        assert_eq!(client.calls(UnitKind::Roadmap), 0);
    }
}
