use tokio::time::Instant;

use crate::{
    constants::prompts::{QUESTION_SET_PROMPT, ROADMAP_PROMPT, VIDEO_RESOURCES_PROMPT},
    errors::TerminalFailure,
    models::{
        domain::{Difficulty, GenerationRequest, QuestionSet, Roadmap, UnitKind, VideoResources},
        dto::model_output::{QuestionSetPayload, RoadmapPayload, VideoResourcesPayload},
    },
    services::{
        chain_orchestrator::UnitStep,
        model_service::ModelInvoker,
        prompt_helpers::{fill_template, schema_json},
        response_validator::{validate_question_set, validate_roadmap, validate_video_resources},
        retry_controller::{RetryController, RetryPolicy},
    },
};

/// Runs individual generation units: builds the prompt, picks the validator and hands
/// both to a retry controller sized by the step and bounded by the request deadline.
#[derive(Clone)]
pub struct StepHandler {
    invoker: ModelInvoker,
    policy: RetryPolicy,
}

impl StepHandler {
    pub fn new(invoker: ModelInvoker, policy: RetryPolicy) -> Self {
        Self { invoker, policy }
    }

    fn controller_for(&self, step: &UnitStep, deadline: Instant) -> RetryController {
        log::info!(
            "Executing {} step: {}",
            step.unit,
            step.description.as_deref().unwrap_or("no description")
        );
        RetryController::new(
            self.invoker.clone(),
            RetryPolicy {
                max_attempts: step.max_attempts,
                ..self.policy
            },
        )
        .with_deadline(deadline)
    }

    pub async fn handle_questions(
        &self,
        step: &UnitStep,
        request: &GenerationRequest,
        deadline: Instant,
    ) -> Result<QuestionSet, TerminalFailure> {
        log::debug!("Question step for user {}", request.username);

        let prompt = question_prompt(request);
        let (count, difficulty) = (request.question_count, request.difficulty);
        self.controller_for(step, deadline)
            .run_unit(UnitKind::Questions, &prompt, |raw| {
                validate_question_set(raw, count, difficulty)
            })
            .await
    }

    pub async fn handle_roadmap(
        &self,
        step: &UnitStep,
        request: &GenerationRequest,
        deadline: Instant,
    ) -> Result<Roadmap, TerminalFailure> {
        let prompt = roadmap_prompt(request);
        self.controller_for(step, deadline)
            .run_unit(UnitKind::Roadmap, &prompt, validate_roadmap)
            .await
    }

    pub async fn handle_videos(
        &self,
        step: &UnitStep,
        request: &GenerationRequest,
        questions: &QuestionSet,
        deadline: Instant,
    ) -> Result<VideoResources, TerminalFailure> {
        let topic_areas = questions.topic_areas();
        let prompt = video_prompt(request, questions);
        self.controller_for(step, deadline)
            .run_unit(UnitKind::Videos, &prompt, |raw| {
                validate_video_resources(raw, &topic_areas)
            })
            .await
    }
}

fn difficulty_rule(difficulty: Difficulty) -> String {
    match difficulty {
        Difficulty::Mixed => "mix \"basic\", \"intermediate\" and \"advanced\" questions across the set. \
            Never use \"mixed\" as a question's difficulty."
            .to_string(),
        level => format!("every question must have \"difficulty\": \"{}\".", level),
    }
}

pub fn question_prompt(request: &GenerationRequest) -> String {
    let count = request.question_count.to_string();
    let rule = difficulty_rule(request.difficulty);
    let schema = schema_json::<QuestionSetPayload>();
    fill_template(
        QUESTION_SET_PROMPT,
        &[
            ("question_count", count.as_str()),
            ("topic", request.topic.as_str()),
            ("username", request.username.as_str()),
            ("difficulty_rule", rule.as_str()),
            ("schema", schema.as_str()),
        ],
    )
}

pub fn roadmap_prompt(request: &GenerationRequest) -> String {
    let schema = schema_json::<RoadmapPayload>();
    fill_template(
        ROADMAP_PROMPT,
        &[
            ("topic", request.topic.as_str()),
            ("difficulty", request.difficulty.as_str()),
            ("schema", schema.as_str()),
        ],
    )
}

pub fn video_prompt(request: &GenerationRequest, questions: &QuestionSet) -> String {
    let topic_areas = questions
        .topic_areas()
        .iter()
        .map(|area| format!("\"{}\"", area))
        .collect::<Vec<_>>()
        .join(", ");
    let schema = schema_json::<VideoResourcesPayload>();
    fill_template(
        VIDEO_RESOURCES_PROMPT,
        &[
            ("topic", request.topic.as_str()),
            ("topic_areas", topic_areas.as_str()),
            ("schema", schema.as_str()),
        ],
    )
}
