//! Turns raw model text into checked records.
//!
//! Checks run in a fixed order and stop at the first failure, which is reported with the
//! check that tripped. A record that passed once passes again when re-serialized and
//! re-validated against the same shape.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::{
    errors::{ValidationCheck, ValidationFailure},
    models::{
        domain::{
            Difficulty, Question, QuestionSet, Roadmap, RoadmapStep, VideoResources,
            OPTIONS_PER_QUESTION,
        },
        dto::model_output::{QuestionSetPayload, RoadmapPayload, VideoResourcesPayload},
    },
};

static STEP_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^step\s*#?\s*(\d+)\s*(.*)$").expect("STEP_REFERENCE is a valid regex pattern")
});

/// What a unit's response is expected to decompose into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpectedShape {
    QuestionSet { count: u32, difficulty: Difficulty },
    Roadmap,
    VideoResources { topic_areas: BTreeSet<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructuredRecord {
    Questions(QuestionSet),
    Roadmap(Roadmap),
    Videos(VideoResources),
}

impl StructuredRecord {
    /// Serializes the record back into the wire envelope the model is asked for.
    pub fn to_raw(&self) -> Result<String, serde_json::Error> {
        match self {
            StructuredRecord::Questions(set) => serde_json::to_string(&QuestionSetPayload {
                questions: set.0.clone(),
            }),
            StructuredRecord::Roadmap(roadmap) => serde_json::to_string(&RoadmapPayload {
                roadmap: roadmap.0.clone(),
            }),
            StructuredRecord::Videos(videos) => serde_json::to_string(&VideoResourcesPayload {
                reference_videos: videos.0.clone(),
            }),
        }
    }
}

pub fn validate(raw: &str, shape: &ExpectedShape) -> Result<StructuredRecord, ValidationFailure> {
    match shape {
        ExpectedShape::QuestionSet { count, difficulty } => {
            validate_question_set(raw, *count, *difficulty).map(StructuredRecord::Questions)
        }
        ExpectedShape::Roadmap => validate_roadmap(raw).map(StructuredRecord::Roadmap),
        ExpectedShape::VideoResources { topic_areas } => {
            validate_video_resources(raw, topic_areas).map(StructuredRecord::Videos)
        }
    }
}

pub fn validate_question_set(
    raw: &str,
    count: u32,
    difficulty: Difficulty,
) -> Result<QuestionSet, ValidationFailure> {
    let payload: QuestionSetPayload = parse_envelope(raw, "question set")?;
    let questions = payload.questions;

    if questions.len() != count as usize {
        return Err(ValidationFailure::new(
            ValidationCheck::QuestionCount,
            format!("expected {} questions, got {}", count, questions.len()),
        ));
    }

    for (index, question) in questions.iter().enumerate() {
        check_question(index, question, difficulty)?;
    }

    Ok(QuestionSet(questions))
}

fn check_question(
    index: usize,
    question: &Question,
    requested: Difficulty,
) -> Result<(), ValidationFailure> {
    let expected_id = index as u32 + 1;
    let fail = |message: String| {
        Err(ValidationFailure::new(
            ValidationCheck::QuestionInvariant,
            format!("question {}: {}", expected_id, message),
        ))
    };

    if question.question_id != expected_id {
        return fail(format!(
            "question_id is {}, expected {}",
            question.question_id, expected_id
        ));
    }
    if question.question_text.trim().is_empty() {
        return fail("question_text is empty".to_string());
    }
    if question.options.len() != OPTIONS_PER_QUESTION {
        return fail(format!(
            "has {} options, expected {}",
            question.options.len(),
            OPTIONS_PER_QUESTION
        ));
    }
    if question.options.iter().any(|o| o.option.trim().is_empty()) {
        return fail("has an empty option".to_string());
    }

    let correct = question.correct_option_count();
    if correct != 1 {
        return fail(format!("has {} correct options, expected exactly 1", correct));
    }

    let mut seen = HashSet::new();
    for option in &question.options {
        if !seen.insert(option.option.trim().to_lowercase()) {
            return fail(format!("option '{}' appears more than once", option.option.trim()));
        }
    }

    if question.explanation.trim().is_empty() {
        return fail("explanation is empty".to_string());
    }
    if !requested.accepts(question.difficulty) {
        return fail(format!(
            "difficulty '{}' does not satisfy requested '{}'",
            question.difficulty, requested
        ));
    }
    if question.topic_area.trim().is_empty() {
        return fail("topic_area is empty".to_string());
    }

    Ok(())
}

pub fn validate_roadmap(raw: &str) -> Result<Roadmap, ValidationFailure> {
    let payload: RoadmapPayload = parse_envelope(raw, "roadmap")?;
    let steps = payload.roadmap;

    if steps.is_empty() {
        return Err(ValidationFailure::new(
            ValidationCheck::StepSequence,
            "roadmap contains no steps",
        ));
    }

    for (index, step) in steps.iter().enumerate() {
        let expected = index as u32 + 1;
        if step.step_number != expected {
            return Err(ValidationFailure::new(
                ValidationCheck::StepSequence,
                format!(
                    "step at position {} has step_number {}, expected {}",
                    expected, step.step_number, expected
                ),
            ));
        }
    }

    for step in &steps {
        if step.title.trim().is_empty() {
            return Err(ValidationFailure::new(
                ValidationCheck::RoadmapInvariant,
                format!("step {} has an empty title", step.step_number),
            ));
        }
    }

    for step in &steps {
        for prerequisite in &step.prerequisites {
            if let Some(referenced) = referenced_step(prerequisite, &steps) {
                if referenced >= step.step_number {
                    return Err(ValidationFailure::new(
                        ValidationCheck::PrerequisiteOrder,
                        format!(
                            "step {} lists prerequisite '{}' which refers to step {}",
                            step.step_number,
                            prerequisite.trim(),
                            referenced
                        ),
                    ));
                }
            }
        }
    }

    Ok(Roadmap(steps))
}

/// Resolves a prerequisite to the earliest step it names, either by title or as
/// "Step N" optionally followed by a `:` or `-` title suffix, with N inside the roadmap.
/// Anything else is an external concept.
fn referenced_step(prerequisite: &str, steps: &[RoadmapStep]) -> Option<u32> {
    let text = prerequisite.trim();

    if let Some(captures) = STEP_REFERENCE.captures(text) {
        let suffix = captures[2].trim_start();
        let bare = suffix.is_empty() || suffix.starts_with(':') || suffix.starts_with('-');
        if let Ok(number) = captures[1].parse::<u32>() {
            if bare && (1..=steps.len() as u32).contains(&number) {
                return Some(number);
            }
        }
    }

    let needle = text.to_lowercase();
    steps
        .iter()
        .filter(|s| s.title.trim().to_lowercase() == needle)
        .map(|s| s.step_number)
        .min()
}

pub fn validate_video_resources(
    raw: &str,
    topic_areas: &BTreeSet<String>,
) -> Result<VideoResources, ValidationFailure> {
    let payload: VideoResourcesPayload = parse_envelope(raw, "video resources")?;
    let videos = payload.reference_videos;

    if videos.is_empty() {
        return Err(ValidationFailure::new(
            ValidationCheck::VideoInvariant,
            "no video resources were returned",
        ));
    }

    for (index, video) in videos.iter().enumerate() {
        if video.title.trim().is_empty() {
            return Err(ValidationFailure::new(
                ValidationCheck::VideoInvariant,
                format!("video {} has an empty title", index + 1),
            ));
        }
        if !video.has_web_url() {
            return Err(ValidationFailure::new(
                ValidationCheck::VideoInvariant,
                format!("video {} has non-web url '{}'", index + 1, video.url),
            ));
        }
    }

    let known: HashSet<String> = topic_areas
        .iter()
        .map(|area| area.trim().to_lowercase())
        .collect();
    for video in &videos {
        if !known.contains(&video.matched_topic_area.trim().to_lowercase()) {
            return Err(ValidationFailure::new(
                ValidationCheck::TopicAreaMatch,
                format!(
                    "video '{}' matches unknown topic area '{}'",
                    video.title.trim(),
                    video.matched_topic_area
                ),
            ));
        }
    }

    Ok(VideoResources(videos))
}

fn parse_envelope<T: DeserializeOwned>(raw: &str, label: &str) -> Result<T, ValidationFailure> {
    let json = extract_json_object(raw).ok_or_else(|| {
        ValidationFailure::new(
            ValidationCheck::Parse,
            format!("{} response contains no JSON object", label),
        )
    })?;

    serde_json::from_str(json).map_err(|e| {
        ValidationFailure::new(
            ValidationCheck::Parse,
            format!("{} response does not match the expected shape: {}", label, e),
        )
    })
}

/// Drops Markdown fences and surrounding prose, keeping the outermost `{...}`.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
