use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::domain::Difficulty;

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct QuestionOption {
    #[serde(alias = "text")]
    pub option: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Question {
    pub question_id: u32,
    pub question_text: String,
    pub options: Vec<QuestionOption>,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub topic_area: String, // sub-category label, used to match videos
}

impl Question {
    pub fn correct_option_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }
}

/// The primary deliverable of a generation. Owned by exactly one result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct QuestionSet(pub Vec<Question>);

impl QuestionSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.0.iter()
    }

    pub fn topic_areas(&self) -> BTreeSet<String> {
        self.0.iter().map(|q| q.topic_area.trim().to_string()).collect()
    }

    pub fn difficulty_distribution(&self) -> BTreeMap<Difficulty, usize> {
        let mut distribution = BTreeMap::new();
        for question in &self.0 {
            *distribution.entry(question.difficulty).or_insert(0) += 1;
        }
        distribution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u32, topic_area: &str, difficulty: Difficulty) -> Question {
        Question {
            question_id: id,
            question_text: format!("Question {}?", id),
            options: vec![
                QuestionOption {
                    option: "A".to_string(),
                    is_correct: true,
                },
                QuestionOption {
                    option: "B".to_string(),
                    is_correct: false,
                },
            ],
            explanation: "Because".to_string(),
            difficulty,
            topic_area: topic_area.to_string(),
        }
    }

    #[test]
    fn option_accepts_text_alias() {
        let option: QuestionOption =
            serde_json::from_str(r#"{"text": "Stack", "is_correct": false}"#).expect("parse");
        assert_eq!(option.option, "Stack");
    }

    #[test]
    fn topic_areas_are_deduplicated_and_trimmed() {
        let set = QuestionSet(vec![
            question(1, "Traversal ", Difficulty::Basic),
            question(2, "Traversal", Difficulty::Basic),
            question(3, "Insertion", Difficulty::Advanced),
        ]);

        let areas: Vec<String> = set.topic_areas().into_iter().collect();
        assert_eq!(areas, vec!["Insertion".to_string(), "Traversal".to_string()]);
    }

    #[test]
    fn difficulty_distribution_counts_levels() {
        let set = QuestionSet(vec![
            question(1, "a", Difficulty::Basic),
            question(2, "a", Difficulty::Basic),
            question(3, "a", Difficulty::Advanced),
        ]);

        let distribution = set.difficulty_distribution();
        assert_eq!(distribution.get(&Difficulty::Basic), Some(&2));
        assert_eq!(distribution.get(&Difficulty::Advanced), Some(&1));
        assert_eq!(distribution.get(&Difficulty::Intermediate), None);
        assert_eq!(set.0[0].correct_option_count(), 1);
    }
}
