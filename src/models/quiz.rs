// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::{PublicQuestion, Question};

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub subject: String,
    /// The teacher who authored the quiz.
    pub teacher_id: i64,
    pub time_limit_minutes: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A quiz with its full question catalog, options and correctness included.
/// This is what the grading engine reads; it never fetches anything itself.
#[derive(Debug, Clone, Serialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

/// Quiz row annotated with aggregate counts, used by both dashboards.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub subject: String,
    pub time_limit_minutes: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub question_count: i64,
    pub result_count: i64,
}

/// DTO for a student taking a quiz. Answers are hidden.
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    pub id: i64,
    pub title: String,
    pub subject: String,
    pub time_limit_minutes: i64,
    pub questions: Vec<PublicQuestion>,
}

impl From<&QuizDetail> for PublicQuiz {
    fn from(detail: &QuizDetail) -> Self {
        Self {
            id: detail.quiz.id,
            title: detail.quiz.title.clone(),
            subject: detail.quiz.subject.clone(),
            time_limit_minutes: detail.quiz.time_limit_minutes,
            questions: detail.questions.iter().map(PublicQuestion::from).collect(),
        }
    }
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(min = 1, max = 100))]
    pub q: String,
}

/// Teacher dashboard: one page of own quizzes plus totals across all of them.
#[derive(Debug, Serialize)]
pub struct TeacherDashboard {
    pub quizzes: Vec<QuizSummary>,
    pub page: i64,
    pub total_pages: i64,
    pub total_quizzes: i64,
    pub total_questions: i64,
    pub total_results: i64,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub quizzes: Vec<QuizSummary>,
    pub taken_quiz_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::AnswerOption;

    #[test]
    fn public_quiz_hides_correct_answers() {
        let detail = QuizDetail {
            quiz: Quiz {
                id: 7,
                title: "Fractions".to_string(),
                subject: "Maths".to_string(),
                teacher_id: 1,
                time_limit_minutes: 15,
                created_at: chrono::Utc::now(),
            },
            questions: vec![Question {
                id: 3,
                quiz_id: 7,
                text: "1/2 + 1/2?".to_string(),
                rationale: Some("Halves add to a whole.".to_string()),
                options: vec![AnswerOption {
                    id: 30,
                    question_id: 3,
                    text: "1".to_string(),
                    is_correct: true,
                    position: 0,
                }],
            }],
        };

        let public = serde_json::to_value(PublicQuiz::from(&detail)).unwrap();
        let text = public.to_string();
        assert!(!text.contains("is_correct"));
        assert!(!text.contains("rationale"));
        assert_eq!(public["questions"][0]["options"][0]["id"], 30);
    }

    #[test]
    fn create_quiz_requires_positive_time_limit() {
        let req = CreateQuizRequest {
            title: "Cells".to_string(),
            subject: "Biology".to_string(),
            time_limit_minutes: 0,
        };
        assert!(req.validate().is_err());
    }
}
