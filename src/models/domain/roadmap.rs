use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct RoadmapStep {
    pub step_number: u32,
    pub title: String,
    pub description: String,
    pub estimated_duration: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Roadmap(pub Vec<RoadmapStep>);

impl Roadmap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoadmapStep> {
        self.0.iter()
    }
}
