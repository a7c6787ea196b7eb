use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::domain::Difficulty;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct VideoResource {
    pub title: String,
    pub url: String,
    #[serde(alias = "difficulty_level")]
    pub difficulty: Difficulty,
    pub matched_topic_area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VideoResource {
    pub fn has_web_url(&self) -> bool {
        let url = self.url.trim();
        url.starts_with("http://") || url.starts_with("https://")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct VideoResources(pub Vec<VideoResource>);

impl VideoResources {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VideoResource> {
        self.0.iter()
    }
}
