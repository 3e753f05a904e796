// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::utils::html::clean_html;

/// Minimum and maximum number of options a manually authored question may carry.
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub rationale: Option<String>,
}

/// Represents the 'options' table in the database.
/// An option is owned by exactly one question and is deleted with it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
    /// Display order within the question, starting at 0.
    pub position: i64,
}

/// A question together with the options it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub rationale: Option<String>,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn from_row(row: QuestionRow, options: Vec<AnswerOption>) -> Self {
        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            text: row.text,
            rationale: row.rationale,
            options,
        }
    }

    /// Looks up one of this question's own options.
    pub fn option(&self, option_id: i64) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    /// A question with no correct option can never be answered correctly.
    pub fn is_scoreable(&self) -> bool {
        self.correct_option().is_some()
    }
}

/// Option as shown to a student taking the quiz (no correctness flag).
#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub id: i64,
    pub text: String,
}

/// DTO for sending a question to a student (excludes correctness and rationale).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub options: Vec<PublicOption>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            text: q.text.clone(),
            options: q
                .options
                .iter()
                .map(|o| PublicOption {
                    id: o.id,
                    text: o.text.clone(),
                })
                .collect(),
        }
    }
}

/// A question ready to be inserted, from either the manual or the AI path.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub text: String,
    pub rationale: Option<String>,
    pub options: Vec<NewOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOption {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOptionRequest {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for creating or replacing a question.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(length(max = 2000))]
    pub rationale: Option<String>,
    #[validate(custom(function = validate_options))]
    pub options: Vec<CreateOptionRequest>,
}

fn validate_options(options: &[CreateOptionRequest]) -> Result<(), validator::ValidationError> {
    if options.len() < MIN_OPTIONS {
        return Err(validator::ValidationError::new("too_few_options"));
    }
    if options.len() > MAX_OPTIONS {
        return Err(validator::ValidationError::new("too_many_options"));
    }
    for opt in options {
        if opt.text.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.text.len() > 200 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    if options.iter().filter(|o| o.is_correct).count() > 1 {
        return Err(validator::ValidationError::new("multiple_correct_options"));
    }
    Ok(())
}

impl From<CreateQuestionRequest> for NewQuestion {
    /// Sanitises teacher-authored text on the way in.
    fn from(req: CreateQuestionRequest) -> Self {
        Self {
            text: clean_html(req.text.trim()),
            rationale: req
                .rationale
                .map(|r| clean_html(r.trim()))
                .filter(|r| !r.is_empty()),
            options: req
                .options
                .into_iter()
                .map(|o| NewOption {
                    text: clean_html(o.text.trim()),
                    is_correct: o.is_correct,
                })
                .collect(),
        }
    }
}
