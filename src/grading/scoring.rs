// src/grading/scoring.rs

use serde::Serialize;

use crate::models::{answer_sheet::AnswerSheet, quiz::QuizDetail};

/// Outcome of one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub correct_count: usize,
    pub total_questions: usize,
    /// `correct_count / total_questions * 100`, or 0 for an empty quiz.
    pub percentage: f64,
}

/// Scores an answer sheet against a quiz catalog.
///
/// Each question of the quiz counts once. A selection only counts when it names
/// one of that question's own options and that option is marked correct, so
/// unknown option ids, options of other questions, selections for questions
/// outside the quiz and questions without a correct option all score nothing.
pub fn score(quiz: &QuizDetail, sheet: &AnswerSheet) -> Score {
    let total_questions = quiz.questions.len();

    let correct_count = quiz
        .questions
        .iter()
        .filter(|question| {
            sheet
                .selection(question.id)
                .and_then(|option_id| question.option(option_id))
                .is_some_and(|option| option.is_correct)
        })
        .count();

    let percentage = if total_questions == 0 {
        0.0
    } else {
        (correct_count as f64 / total_questions as f64) * 100.0
    };

    Score {
        correct_count,
        total_questions,
        percentage,
    }
}
