pub use fixtures::*;
pub use test_helpers::*;

#[cfg(test)]
pub mod fixtures {
    use serde_json::json;

    use crate::models::{
        domain::{
            Difficulty, GenerationRequest, Question, QuestionOption, QuestionSet, RoadmapStep,
            VideoResource,
        },
        dto::model_output::{QuestionSetPayload, RoadmapPayload, VideoResourcesPayload},
    };

    pub const TOPIC_AREAS: [&str; 3] = ["Fundamentals", "Traversal", "Insertion"];

    /// Linked Lists style request: basic, 5 questions, roadmap and videos included
    pub fn sample_request(topic: &str) -> GenerationRequest {
        GenerationRequest {
            username: "john_doe".to_string(),
            topic: topic.to_string(),
            difficulty: Difficulty::Basic,
            question_count: 5,
            include_roadmap: true,
            include_videos: true,
        }
    }

    fn level_for(index: usize, requested: Difficulty) -> Difficulty {
        match requested {
            Difficulty::Mixed => [
                Difficulty::Basic,
                Difficulty::Intermediate,
                Difficulty::Advanced,
            ][index % 3],
            level => level,
        }
    }

    /// Questions that satisfy every structural check for `difficulty`
    pub fn sample_question_set(count: u32, difficulty: Difficulty) -> QuestionSet {
        let questions = (0..count as usize)
            .map(|index| Question {
                question_id: index as u32 + 1,
                question_text: format!("Which statement about case {} is true?", index + 1),
                options: (0..4)
                    .map(|option| QuestionOption {
                        option: format!("Option {} for case {}", option + 1, index + 1),
                        is_correct: option == index % 4,
                    })
                    .collect(),
                explanation: format!("Option {} is the only accurate statement.", index % 4 + 1),
                difficulty: level_for(index, difficulty),
                topic_area: TOPIC_AREAS[index % TOPIC_AREAS.len()].to_string(),
            })
            .collect();
        QuestionSet(questions)
    }

    pub fn question_set_json(count: u32, difficulty: Difficulty) -> String {
        let payload = QuestionSetPayload {
            questions: sample_question_set(count, difficulty).0,
        };
        serde_json::to_string(&payload).expect("fixture serializes")
    }

    /// Roadmap whose steps each depend on the previous one by title
    pub fn roadmap_json(steps: u32) -> String {
        let roadmap = (1..=steps)
            .map(|n| RoadmapStep {
                step_number: n,
                title: format!("Stage {}", n),
                description: format!("Work through stage {} material.", n),
                estimated_duration: "1-2 weeks".to_string(),
                prerequisites: if n == 1 {
                    vec!["Basic programming knowledge".to_string()]
                } else {
                    vec![format!("Stage {}", n - 1)]
                },
            })
            .collect();
        serde_json::to_string(&RoadmapPayload { roadmap }).expect("fixture serializes")
    }

    /// Three steps where step 1 depends on step 3
    pub fn cyclic_roadmap_json() -> String {
        json!({
            "roadmap": [
                {"step_number": 1, "title": "Nodes", "description": "d", "estimated_duration": "1 week",
                 "prerequisites": ["Step 3"]},
                {"step_number": 2, "title": "Pointers", "description": "d", "estimated_duration": "1 week",
                 "prerequisites": ["Nodes"]},
                {"step_number": 3, "title": "Traversal", "description": "d", "estimated_duration": "1 week",
                 "prerequisites": ["Pointers"]}
            ]
        })
        .to_string()
    }

    pub fn video_resources_json(topic_areas: &[&str]) -> String {
        let reference_videos = topic_areas
            .iter()
            .enumerate()
            .map(|(index, area)| VideoResource {
                title: format!("Lecture {}", index + 1),
                url: format!(
                    "https://www.youtube.com/results?search_query=lecture+{}",
                    index + 1
                ),
                difficulty: Difficulty::Basic,
                matched_topic_area: area.to_string(),
                duration: Some("12 minutes".to_string()),
                description: None,
            })
            .collect();
        serde_json::to_string(&VideoResourcesPayload { reference_videos })
            .expect("fixture serializes")
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use actix_web::http::StatusCode;
    use async_trait::async_trait;

    use super::fixtures::{question_set_json, roadmap_json, video_resources_json};
    use crate::{
        errors::{TransportFailure, TransportReason},
        models::domain::{Difficulty, UnitKind},
        services::model_service::ModelClient,
    };

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }

    /// Which unit a prompt belongs to, judged by the envelope key it asks for.
    pub fn unit_for_prompt(prompt: &str) -> UnitKind {
        if prompt.contains("\"reference_videos\"") {
            UnitKind::Videos
        } else if prompt.contains("\"roadmap\"") {
            UnitKind::Roadmap
        } else {
            UnitKind::Questions
        }
    }

    #[derive(Default)]
    struct Script {
        responses: HashMap<UnitKind, Result<String, TransportFailure>>,
        delays: HashMap<UnitKind, Duration>,
        calls: HashMap<UnitKind, usize>,
    }

    /// In-memory model that answers each unit with a fixed response.
    #[derive(Clone, Default)]
    pub struct ScriptedModelClient {
        script: Arc<Mutex<Script>>,
    }

    impl ScriptedModelClient {
        /// Valid answers for a 5-question basic request
        pub fn valid() -> Self {
            Self::default()
                .with_response(UnitKind::Questions, &question_set_json(5, Difficulty::Basic))
                .with_response(UnitKind::Roadmap, &roadmap_json(3))
                .with_response(UnitKind::Videos, &video_resources_json(&["Fundamentals"]))
        }

        pub fn with_response(self, unit: UnitKind, response: &str) -> Self {
            self.script
                .lock()
                .expect("script lock")
                .responses
                .insert(unit, Ok(response.to_string()));
            self
        }

        pub fn with_failure(self, unit: UnitKind, reason: TransportReason) -> Self {
            self.script
                .lock()
                .expect("script lock")
                .responses
                .insert(unit, Err(TransportFailure::new(reason, "scripted failure")));
            self
        }

        pub fn with_delay(self, unit: UnitKind, delay: Duration) -> Self {
            self.script
                .lock()
                .expect("script lock")
                .delays
                .insert(unit, delay);
            self
        }

        pub fn calls(&self, unit: UnitKind) -> usize {
            self.script
                .lock()
                .expect("script lock")
                .calls
                .get(&unit)
                .copied()
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModelClient {
        async fn complete(&self, prompt: &str) -> Result<String, TransportFailure> {
            let unit = unit_for_prompt(prompt);
            let (response, delay) = {
                let mut script = self.script.lock().expect("script lock");
                *script.calls.entry(unit).or_insert(0) += 1;
                (
                    script.responses.get(&unit).cloned(),
                    script.delays.get(&unit).copied(),
                )
            };

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            response.unwrap_or_else(|| {
                Err(TransportFailure::new(
                    TransportReason::Rejected,
                    format!("no scripted response for {} unit", unit),
                ))
            })
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{Difficulty, UnitKind},
        services::{
            response_validator::validate_question_set,
            step_executor::{question_prompt, roadmap_prompt, video_prompt},
        },
    };

    #[test]
    fn test_fixtures_question_set_is_valid() {
        let raw = question_set_json(7, Difficulty::Mixed);
        let set = validate_question_set(&raw, 7, Difficulty::Mixed).expect("fixture valid");
        assert_eq!(set.len(), 7);
        assert_eq!(set.topic_areas().len(), 3);
    }

    #[test]
    fn test_prompts_dispatch_to_their_unit() {
        let request = sample_request("Linked Lists");
        let questions = sample_question_set(5, Difficulty::Basic);

        assert_eq!(unit_for_prompt(&question_prompt(&request)), UnitKind::Questions);
        assert_eq!(unit_for_prompt(&roadmap_prompt(&request)), UnitKind::Roadmap);
        assert_eq!(
            unit_for_prompt(&video_prompt(&request, &questions)),
            UnitKind::Videos
        );
    }
}
