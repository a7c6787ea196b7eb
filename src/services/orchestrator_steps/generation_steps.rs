use crate::{
    models::domain::{GenerationRequest, UnitKind},
    services::chain_orchestrator::UnitStep,
};

/// Builds the unit plan for one request. The question unit is always first; roadmap and
/// videos appear only when requested.
pub fn create_generation_steps(request: &GenerationRequest, max_attempts: u32) -> Vec<UnitStep> {
    let mut steps = vec![create_questions_step(request, max_attempts)];

    if request.include_roadmap {
        steps.push(create_roadmap_step(max_attempts));
    }
    if request.include_videos {
        steps.push(create_videos_step(max_attempts));
    }

    steps
}

fn create_questions_step(request: &GenerationRequest, max_attempts: u32) -> UnitStep {
    UnitStep::new(UnitKind::Questions)
        .with_description(format!(
            "Generate {} {} questions via model service call",
            request.question_count, request.difficulty
        ))
        .with_max_attempts(max_attempts)
}

fn create_roadmap_step(max_attempts: u32) -> UnitStep {
    UnitStep::new(UnitKind::Roadmap)
        .with_description("Generate an ordered learning roadmap for the topic")
        .with_max_attempts(max_attempts)
}

fn create_videos_step(max_attempts: u32) -> UnitStep {
    UnitStep::new(UnitKind::Videos)
        .with_description("Suggest video resources matched to the question topic areas")
        .with_max_attempts(max_attempts)
}
