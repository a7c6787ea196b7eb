use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::models::domain::UnitKind;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InputError(String),

    #[error("Model service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::InputError(_) => "INPUT_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::ConfigError(_) => "CONFIG_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub kind: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InputError(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
            kind: self.error_code(),
        })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InputError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Why a call to the model never produced usable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportReason {
    Network,
    Timeout,
    RateLimited,
    Rejected,
}

impl fmt::Display for TransportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportReason::Network => write!(f, "network"),
            TransportReason::Timeout => write!(f, "timeout"),
            TransportReason::RateLimited => write!(f, "rate_limited"),
            TransportReason::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failure ({reason}): {message}")]
pub struct TransportFailure {
    pub reason: TransportReason,
    pub message: String,
}

impl TransportFailure {
    pub fn new(reason: TransportReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

/// The structural check a model response failed, in the order checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCheck {
    Parse,
    QuestionCount,
    QuestionInvariant,
    StepSequence,
    PrerequisiteOrder,
    RoadmapInvariant,
    VideoInvariant,
    TopicAreaMatch,
}

impl fmt::Display for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationCheck::Parse => "parse",
            ValidationCheck::QuestionCount => "question_count",
            ValidationCheck::QuestionInvariant => "question_invariant",
            ValidationCheck::StepSequence => "step_sequence",
            ValidationCheck::PrerequisiteOrder => "prerequisite_order",
            ValidationCheck::RoadmapInvariant => "roadmap_invariant",
            ValidationCheck::VideoInvariant => "video_invariant",
            ValidationCheck::TopicAreaMatch => "topic_area_match",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed at {check}: {message}")]
pub struct ValidationFailure {
    pub check: ValidationCheck,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(check: ValidationCheck, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }
}

/// One failed attempt inside a generation unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error(transparent)]
    Transport(#[from] TransportFailure),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

impl AttemptFailure {
    pub fn category(&self) -> &'static str {
        match self {
            AttemptFailure::Transport(_) => "transport",
            AttemptFailure::Validation(_) => "validation",
        }
    }
}

/// A generation unit ran out of attempts or hit the request deadline. Keeps every
/// attempt's reason, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{unit} unit failed after {} attempt(s)", .attempts.len())]
pub struct TerminalFailure {
    pub unit: UnitKind,
    pub attempts: Vec<AttemptFailure>,
    pub deadline_reached: bool,
}
