use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{config::Config, models::domain::Difficulty};

#[derive(Debug, Serialize)]
pub struct GenerationLimitsDto {
    pub min_questions_per_request: u32,
    pub max_questions_per_request: u32,
    pub default_question_count: u32,
    pub supported_difficulties: Vec<Difficulty>,
    pub max_batch_size: usize,
    pub batch_concurrency_limit: usize,
}

#[derive(Debug, Serialize)]
pub struct RetryPolicyDto {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub model_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub provider: &'static str,
    pub limits: GenerationLimitsDto,
    pub retry: RetryPolicyDto,
    pub timestamp: DateTime<Utc>,
}

impl From<&Config> for StatsResponse {
    fn from(config: &Config) -> Self {
        let g = &config.generation;
        StatsResponse {
            service: "MCQ Generator API",
            version: env!("CARGO_PKG_VERSION"),
            provider: config.model.provider.as_str(),
            limits: GenerationLimitsDto {
                min_questions_per_request: g.min_question_count,
                max_questions_per_request: g.max_question_count,
                default_question_count: g.default_question_count,
                supported_difficulties: Difficulty::ALL.to_vec(),
                max_batch_size: g.max_batch_size,
                batch_concurrency_limit: g.batch_concurrency_limit,
            },
            retry: RetryPolicyDto {
                max_attempts: g.max_attempts,
                base_delay_ms: g.retry_base_delay.as_millis() as u64,
                max_delay_ms: g.retry_max_delay.as_millis() as u64,
                model_timeout_seconds: g.model_timeout.as_secs(),
                request_timeout_seconds: g.request_timeout.as_secs(),
            },
            timestamp: Utc::now(),
        }
    }
}
