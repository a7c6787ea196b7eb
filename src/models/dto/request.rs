use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::{
    config::GenerationSettings,
    errors::{AppError, AppResult},
    models::domain::{Difficulty, GenerationRequest},
};

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]+$").expect("USERNAME_REGEX is a valid regex pattern")
});

const MIN_TOPIC_CHARS: usize = 2;
const MAX_TOPIC_CHARS: usize = 200;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateMcqRequestDto {
    #[validate(
        length(min = 2, max = 50),
        regex(
            path = *USERNAME_REGEX,
            message = "Username must contain only alphanumeric characters, hyphens, and underscores"
        )
    )]
    pub username: String,

    // Bounds are checked on the trimmed value in `into_request`.
    pub topic: String,

    #[serde(default)]
    pub difficulty: Difficulty,

    // Signed so out-of-range values reach bounds checking instead of failing to parse.
    pub question_count: Option<i64>,

    #[serde(default = "default_true")]
    pub include_roadmap: bool,

    #[serde(default = "default_true")]
    pub include_videos: bool,
}

impl GenerateMcqRequestDto {
    /// Validates every field against `settings` and builds the pipeline request.
    /// Out-of-range values are rejected, never clamped.
    pub fn into_request(self, settings: &GenerationSettings) -> AppResult<GenerationRequest> {
        self.validate()?;

        let topic = self.topic.trim().to_string();
        let topic_len = topic.chars().count();
        if !(MIN_TOPIC_CHARS..=MAX_TOPIC_CHARS).contains(&topic_len) {
            return Err(AppError::InputError(format!(
                "topic must be between {} and {} characters after trimming, got {}",
                MIN_TOPIC_CHARS, MAX_TOPIC_CHARS, topic_len
            )));
        }

        let question_count = self
            .question_count
            .unwrap_or(i64::from(settings.default_question_count));
        let (min, max) = (
            i64::from(settings.min_question_count),
            i64::from(settings.max_question_count),
        );
        if question_count < min || question_count > max {
            return Err(AppError::InputError(format!(
                "question_count must be between {} and {}, got {}",
                min, max, question_count
            )));
        }

        Ok(GenerationRequest {
            username: self.username,
            topic,
            difficulty: self.difficulty,
            question_count: question_count as u32,
            include_roadmap: self.include_roadmap,
            include_videos: self.include_videos,
        })
    }
}

/// Validates a whole batch up front. Any invalid member rejects the batch before a
/// single model call is made.
pub fn into_batch_requests(
    requests: Vec<GenerateMcqRequestDto>,
    settings: &GenerationSettings,
) -> AppResult<Vec<GenerationRequest>> {
    if requests.is_empty() {
        return Err(AppError::InputError(
            "batch must contain at least one request".to_string(),
        ));
    }
    if requests.len() > settings.max_batch_size {
        return Err(AppError::InputError(format!(
            "Maximum {} requests allowed in batch, got {}",
            settings.max_batch_size,
            requests.len()
        )));
    }

    let mut seen_topics = HashSet::new();
    let mut validated = Vec::with_capacity(requests.len());
    for (index, dto) in requests.into_iter().enumerate() {
        let request = dto.into_request(settings).map_err(|err| match err {
            AppError::InputError(msg) => AppError::InputError(format!("request {}: {}", index, msg)),
            other => other,
        })?;

        if !seen_topics.insert(request.topic.to_lowercase()) {
            return Err(AppError::InputError(format!(
                "request {}: duplicate topic '{}' in batch",
                index, request.topic
            )));
        }
        validated.push(request);
    }

    Ok(validated)
}
