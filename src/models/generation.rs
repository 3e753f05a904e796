// src/models/generation.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::{NewOption, NewQuestion};
use crate::utils::html::clean_html;

/// Every AI-generated question carries exactly this many options.
pub const GENERATED_OPTION_COUNT: usize = 4;
const MAX_CORRECT_INDEX: usize = GENERATED_OPTION_COUNT - 1;
const GENERATED_OPTION_COUNT_U64: u64 = GENERATED_OPTION_COUNT as u64;
pub const MAX_GENERATED_QUESTIONS: u32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// DTO for asking the AI collaborator to fill a quiz.
/// The subject is taken from the target quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuestionsRequest {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    #[validate(range(min = 1, max = MAX_GENERATED_QUESTIONS))]
    pub question_count: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// One question object as the AI collaborator must return it.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct GeneratedQuestion {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(length(equal = GENERATED_OPTION_COUNT_U64), custom(function = validate_generated_options))]
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    #[validate(range(max = MAX_CORRECT_INDEX))]
    pub correct_index: usize,
    #[serde(default)]
    pub rationale: Option<String>,
}

fn validate_generated_options(options: &[String]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 200 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

impl From<GeneratedQuestion> for NewQuestion {
    fn from(q: GeneratedQuestion) -> Self {
        let correct_index = q.correct_index;
        Self {
            text: clean_html(q.text.trim()),
            rationale: q
                .rationale
                .map(|r| clean_html(r.trim()))
                .filter(|r| !r.is_empty()),
            options: q
                .options
                .into_iter()
                .enumerate()
                .map(|(i, text)| NewOption {
                    text: clean_html(text.trim()),
                    is_correct: i == correct_index,
                })
                .collect(),
        }
    }
}

/// Body returned after generated questions were stored.
#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub created: usize,
    pub question_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(options: Vec<&str>, correct_index: usize) -> GeneratedQuestion {
        GeneratedQuestion {
            text: "Which planet is largest?".to_string(),
            options: options.into_iter().map(String::from).collect(),
            correct_index,
            rationale: Some("Jupiter is the largest planet.".to_string()),
        }
    }

    #[test]
    fn valid_question_converts_with_one_correct_option() {
        let q = generated(vec!["Mars", "Jupiter", "Venus", "Earth"], 1);
        assert!(q.validate().is_ok());

        let new = NewQuestion::from(q);
        assert_eq!(new.options.len(), GENERATED_OPTION_COUNT);
        let correct: Vec<_> = new.options.iter().filter(|o| o.is_correct).collect();
        assert_eq!(correct.len(), 1);
        assert_eq!(correct[0].text, "Jupiter");
    }

    #[test]
    fn rejects_wrong_option_count() {
        let q = generated(vec!["Mars", "Jupiter", "Venus"], 1);
        assert!(q.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_index() {
        let q = generated(vec!["Mars", "Jupiter", "Venus", "Earth"], 4);
        assert!(q.validate().is_err());
    }

    #[test]
    fn difficulty_defaults_to_medium() {
        let req: GenerateQuestionsRequest =
            serde_json::from_str(r#"{"topic": "Photosynthesis", "question_count": 3}"#).unwrap();
        assert_eq!(req.difficulty, Difficulty::Medium);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_caps_question_count() {
        let req = GenerateQuestionsRequest {
            topic: "Algebra".to_string(),
            question_count: MAX_GENERATED_QUESTIONS + 1,
            difficulty: Difficulty::Hard,
        };
        assert!(req.validate().is_err());
    }
}
