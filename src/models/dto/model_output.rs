//! Wire shapes the model is asked to return. Each unit's response must decompose
//! into exactly one of these envelopes before any domain check runs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::domain::{Question, RoadmapStep, VideoResource};

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct QuestionSetPayload {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RoadmapPayload {
    pub roadmap: Vec<RoadmapStep>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct VideoResourcesPayload {
    pub reference_videos: Vec<VideoResource>,
}
