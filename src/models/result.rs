// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::grading::Performance;
use crate::models::quiz::Quiz;

/// Represents the 'results' table in the database.
/// One row per (student, quiz); never updated once written.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: i64,
    pub student_id: i64,
    pub quiz_id: i64,
    /// Percentage in [0, 100].
    pub score: f64,
    pub completed_on: chrono::DateTime<chrono::Utc>,
}

/// A student's own result joined with the quiz title.
#[derive(Debug, Serialize, FromRow)]
pub struct StudentResultEntry {
    pub id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub score: f64,
    pub completed_on: chrono::DateTime<chrono::Utc>,
}

/// A result on one of the teacher's quizzes, joined with the student's username.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizResultEntry {
    pub id: i64,
    pub student_id: i64,
    pub username: String,
    pub score: f64,
    pub completed_on: chrono::DateTime<chrono::Utc>,
}

/// Result page payload: the result, its quiz, and the performance tier.
#[derive(Debug, Serialize)]
pub struct ResultView {
    pub result: QuizResult,
    pub quiz: Quiz,
    pub performance: Performance,
}

/// Body returned after a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub result_id: i64,
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub performance: Performance,
}
