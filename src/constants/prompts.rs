pub const SYSTEM_PROMPT: &str = "You are an expert educational content generator specializing in comprehensive learning materials. You respond with a single valid JSON object and nothing else: no markdown, no commentary.";

pub const QUESTION_SET_PROMPT: &str = r#"Generate exactly {question_count} multiple-choice questions (MCQs) on the topic "{topic}" for user "{username}".

Difficulty: {difficulty_rule}

## MCQ REQUIREMENTS

- Each question has exactly 4 options and exactly ONE option with "is_correct": true.
- The 4 option texts within a question must all be different.
- question_id values run 1, 2, 3, ... in order with no gaps.
- Every question has a detailed explanation (50-150 words) of why the correct option is right and why the others are wrong.
- Every question has a short topic_area naming the sub-topic it covers. Reuse the same label for questions on the same sub-topic.
- Questions cover different aspects of the topic and are clear, unambiguous and technically accurate.

## OUTPUT

Return ONLY a JSON object with the single key "questions", conforming to this JSON schema:
{schema}

Generate EXACTLY {question_count} questions. Fewer is a failure."#;

pub const ROADMAP_PROMPT: &str = r#"You are an expert curriculum designer. Create a learning roadmap for the topic "{topic}" that takes a learner from {difficulty} level to an advanced level.

## ROADMAP REQUIREMENTS

- 5 to 8 sequential steps. step_number starts at 1 and increases by exactly 1 with no gaps.
- Each step has a clear, actionable title, a detailed description (100-200 words) and a realistic estimated_duration such as "2-3 weeks".
- prerequisites may name external concepts or the titles of EARLIER steps only. A step never lists itself or a later step.

## OUTPUT

Return ONLY a JSON object with the single key "roadmap", conforming to this JSON schema:
{schema}"#;

pub const VIDEO_RESOURCES_PROMPT: &str = r#"You are an expert educational content curator. Suggest 3 to 5 high-quality video resources for the topic "{topic}".

## VIDEO REQUIREMENTS

- matched_topic_area must be copied exactly from this list of sub-topics: {topic_areas}
- url must start with https:// and point at a real educational platform. Prefer search URLs (YouTube, Coursera, Khan Academy) over guessed video ids.
- difficulty is one of "basic", "intermediate", "advanced". Mix levels where possible.
- Optionally include duration and a brief description of the content.

## OUTPUT

Return ONLY a JSON object with the single key "reference_videos", conforming to this JSON schema:
{schema}"#;

pub const CORRECTIVE_PROMPT: &str = r#"

## CORRECTION (attempt {attempt})

Your previous response was rejected: {reason}
Return a corrected response that satisfies every requirement above."#;
