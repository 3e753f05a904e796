// src/models/answer_sheet.rs

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

/// Form fields carrying a selection are named `question_<id>`.
pub const FIELD_PREFIX: &str = "question_";

/// Upper bound on selections in one submission.
pub const MAX_SELECTIONS: usize = 500;

/// Rejections raised while decoding a submission, before any scoring happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerSheetError {
    #[error("invalid question id in field '{0}'")]
    InvalidQuestionId(String),

    #[error("invalid option id '{value}' for question {question_id}")]
    InvalidOptionId { question_id: i64, value: String },

    #[error("too many selections: {0}")]
    TooManySelections(usize),
}

/// A student's selections for one attempt: question id -> chosen option id.
/// Skipped questions are simply absent. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    selections: HashMap<i64, i64>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, question_id: i64, option_id: i64) {
        self.selections.insert(question_id, option_id);
    }

    pub fn selection(&self, question_id: i64) -> Option<i64> {
        self.selections.get(&question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Decodes form-encoded fields.
    ///
    /// * Fields without the `question_` prefix are ignored.
    /// * An empty value means the question was skipped.
    /// * Non-numeric ids on either side are rejected.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, AnswerSheetError> {
        let mut sheet = Self::new();

        for (name, value) in fields {
            let Some(raw_id) = name.strip_prefix(FIELD_PREFIX) else {
                continue;
            };
            let question_id = raw_id
                .parse::<i64>()
                .map_err(|_| AnswerSheetError::InvalidQuestionId(name.clone()))?;

            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let option_id = value
                .parse::<i64>()
                .map_err(|_| AnswerSheetError::InvalidOptionId {
                    question_id,
                    value: value.to_string(),
                })?;

            sheet.select(question_id, option_id);
        }

        sheet.check_size()?;
        Ok(sheet)
    }

    fn check_size(&self) -> Result<(), AnswerSheetError> {
        if self.selections.len() > MAX_SELECTIONS {
            return Err(AnswerSheetError::TooManySelections(self.selections.len()));
        }
        Ok(())
    }
}

/// DTO for JSON submissions.
/// Key: question id. Value: selected option id, or null when skipped.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: HashMap<i64, Option<i64>>,
}

impl TryFrom<SubmitAnswersRequest> for AnswerSheet {
    type Error = AnswerSheetError;

    fn try_from(req: SubmitAnswersRequest) -> Result<Self, Self::Error> {
        let mut sheet = AnswerSheet::new();
        for (question_id, option_id) in req.answers {
            if let Some(option_id) = option_id {
                sheet.select(question_id, option_id);
            }
        }
        sheet.check_size()?;
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn decodes_prefixed_fields_and_ignores_others() {
        let fields = form(&[
            ("csrfmiddlewaretoken", "abc"),
            ("question_1", "10"),
            ("question_2", "21"),
        ]);
        let sheet = AnswerSheet::from_form(&fields).unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.selection(1), Some(10));
        assert_eq!(sheet.selection(2), Some(21));
    }

    #[test]
    fn empty_value_means_skipped() {
        let fields = form(&[("question_1", ""), ("question_2", " 5 ")]);
        let sheet = AnswerSheet::from_form(&fields).unwrap();
        assert_eq!(sheet.selection(1), None);
        assert_eq!(sheet.selection(2), Some(5));
    }

    #[test]
    fn rejects_non_numeric_question_id() {
        let fields = form(&[("question_abc", "1")]);
        assert_eq!(
            AnswerSheet::from_form(&fields),
            Err(AnswerSheetError::InvalidQuestionId("question_abc".to_string()))
        );
    }

    #[test]
    fn rejects_non_numeric_option_id() {
        let fields = form(&[("question_4", "B")]);
        assert!(matches!(
            AnswerSheet::from_form(&fields),
            Err(AnswerSheetError::InvalidOptionId { question_id: 4, .. })
        ));
    }

    #[test]
    fn rejects_oversized_submission() {
        let fields: HashMap<String, String> = (0..=MAX_SELECTIONS as i64)
            .map(|i| (format!("question_{i}"), "1".to_string()))
            .collect();
        assert!(matches!(
            AnswerSheet::from_form(&fields),
            Err(AnswerSheetError::TooManySelections(_))
        ));
    }

    #[test]
    fn json_submission_drops_null_selections() {
        let req: SubmitAnswersRequest =
            serde_json::from_str(r#"{"answers": {"1": 10, "2": null}}"#).unwrap();
        let sheet = AnswerSheet::try_from(req).unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.selection(1), Some(10));
    }
}
