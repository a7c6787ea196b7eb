use std::{collections::BTreeMap, fmt, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AttemptFailure, TerminalFailure},
    models::domain::{Difficulty, QuestionSet, Roadmap, VideoResources},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Questions,
    Roadmap,
    Videos,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Questions => write!(f, "questions"),
            UnitKind::Roadmap => write!(f, "roadmap"),
            UnitKind::Videos => write!(f, "videos"),
        }
    }
}

/// A validated request for one topic. Only built through the request DTO conversion,
/// which checks every field against the configured bounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub username: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub include_roadmap: bool,
    pub include_videos: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Success,
    Partial,
    Failed,
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStatus::Success => write!(f, "success"),
            GenerationStatus::Partial => write!(f, "partial"),
            GenerationStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitErrorKind {
    Exhausted,
    Timeout,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub category: &'static str,
    pub reason: String,
}

/// A unit that did not produce its record, with enough history to diagnose why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnitError {
    pub unit: UnitKind,
    pub kind: UnitErrorKind,
    pub message: String,
    pub attempts: Vec<AttemptRecord>,
}

impl From<TerminalFailure> for UnitError {
    fn from(failure: TerminalFailure) -> Self {
        let (kind, message) = if failure.deadline_reached {
            (
                UnitErrorKind::Timeout,
                format!(
                    "{} unit abandoned at the request deadline after {} attempt(s)",
                    failure.unit,
                    failure.attempts.len()
                ),
            )
        } else {
            (UnitErrorKind::Exhausted, failure.to_string())
        };
        let attempts = failure
            .attempts
            .iter()
            .enumerate()
            .map(|(index, attempt)| AttemptRecord {
                attempt: index as u32 + 1,
                category: attempt.category(),
                reason: match attempt {
                    AttemptFailure::Transport(t) => t.to_string(),
                    AttemptFailure::Validation(v) => v.to_string(),
                },
            })
            .collect();

        Self {
            unit: failure.unit,
            kind,
            message,
            attempts,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationMetadata {
    pub total_questions: usize,
    pub difficulty_distribution: BTreeMap<Difficulty, usize>,
    pub roadmap_steps: usize,
    pub reference_video_count: usize,
    pub generation_time_seconds: f64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationResult {
    pub request: GenerationRequest,
    pub status: GenerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<QuestionSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roadmap: Option<Roadmap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_videos: Option<VideoResources>,
    pub errors: Vec<UnitError>,
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    /// Finalizes a result. Status follows from what was produced: no questions means
    /// failed, any recorded enhancement error means partial.
    pub fn finalize(
        request: GenerationRequest,
        questions: Option<QuestionSet>,
        roadmap: Option<Roadmap>,
        reference_videos: Option<VideoResources>,
        errors: Vec<UnitError>,
        elapsed: Duration,
    ) -> Self {
        let status = match (&questions, errors.is_empty()) {
            (None, _) => GenerationStatus::Failed,
            (Some(_), true) => GenerationStatus::Success,
            (Some(_), false) => GenerationStatus::Partial,
        };

        let metadata = GenerationMetadata {
            total_questions: questions.as_ref().map_or(0, QuestionSet::len),
            difficulty_distribution: questions
                .as_ref()
                .map(QuestionSet::difficulty_distribution)
                .unwrap_or_default(),
            roadmap_steps: roadmap.as_ref().map_or(0, Roadmap::len),
            reference_video_count: reference_videos.as_ref().map_or(0, VideoResources::len),
            generation_time_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
            generated_at: Utc::now(),
        };

        Self {
            request,
            status,
            questions,
            roadmap,
            reference_videos,
            errors,
            metadata,
        }
    }

    pub fn error_for(&self, unit: UnitKind) -> Option<&UnitError> {
        self.errors.iter().find(|e| e.unit == unit)
    }
}
