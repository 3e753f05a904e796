// src/handlers/student.rs

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    generation::QuizGenerator,
    grading::{classify, score},
    models::{
        answer_sheet::{AnswerSheet, AnswerSheetError, SubmitAnswersRequest},
        quiz::{PublicQuiz, QuizDetail, StudentDashboard},
        result::{ResultView, SubmissionResponse},
    },
    store::{
        quizzes,
        results::{self, Recorded},
    },
    utils::jwt::Claims,
};

fn result_location(result_id: i64) -> String {
    format!("/api/student/results/{}", result_id)
}

async fn quiz_detail(pool: &SqlitePool, quiz_id: i64) -> Result<QuizDetail, AppError> {
    quizzes::find_detail(pool, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

/// Lists all quizzes plus the ids of those the student already took.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id()?;

    let quizzes = quizzes::all_summaries(&pool).await?;
    let taken_quiz_ids = results::taken_quiz_ids(&pool, student_id).await?;

    Ok(Json(StudentDashboard {
        quizzes,
        taken_quiz_ids,
    }))
}

/// Serves a quiz for taking, with correctness and rationales stripped.
/// Redirects to the existing result when the quiz was already taken.
pub async fn take_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<Response, AppError> {
    let student_id = claims.user_id()?;
    let detail = quiz_detail(&pool, quiz_id).await?;

    if let Some(existing) = results::find_for_student_quiz(&pool, student_id, quiz_id).await? {
        return Ok(Redirect::to(&result_location(existing.id)).into_response());
    }

    Ok(Json(PublicQuiz::from(&detail)).into_response())
}

/// Form-encoded submission: `question_<id>=<option id>` pairs.
pub async fn submit_form(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    submit(&pool, &claims, quiz_id, || AnswerSheet::from_form(&fields)).await
}

/// JSON submission: `{ "answers": { "<question id>": <option id | null> } }`.
pub async fn submit_json(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<Response, AppError> {
    submit(&pool, &claims, quiz_id, || AnswerSheet::try_from(payload)).await
}

/// Shared submission flow.
///
/// A student gets exactly one result per quiz. An existing result short
/// circuits to a 303 before the answers are even parsed.
async fn submit<F>(
    pool: &SqlitePool,
    claims: &Claims,
    quiz_id: i64,
    build_sheet: F,
) -> Result<Response, AppError>
where
    F: FnOnce() -> Result<AnswerSheet, AnswerSheetError>,
{
    let student_id = claims.user_id()?;
    let detail = quiz_detail(pool, quiz_id).await?;

    if let Some(existing) = results::find_for_student_quiz(pool, student_id, quiz_id).await? {
        tracing::info!(
            "Student {} resubmitted quiz {}; keeping result {}",
            student_id,
            quiz_id,
            existing.id
        );
        return Ok(Redirect::to(&result_location(existing.id)).into_response());
    }

    let sheet = build_sheet()?;
    let outcome = score(&detail, &sheet);

    let result = match results::record(pool, student_id, quiz_id, outcome.percentage).await? {
        Recorded::Created(result) => result,
        // Lost a race against a concurrent submission.
        Recorded::Existing(existing) => {
            return Ok(Redirect::to(&result_location(existing.id)).into_response());
        }
    };

    tracing::info!(
        "Student {} scored {:.2}% ({}/{}) on quiz {}",
        student_id,
        outcome.percentage,
        outcome.correct_count,
        outcome.total_questions,
        quiz_id
    );

    let body = SubmissionResponse {
        result_id: result.id,
        score: result.score,
        correct_count: outcome.correct_count,
        total_questions: outcome.total_questions,
        performance: classify(result.score),
    };

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, result_location(result.id))],
        Json(body),
    )
        .into_response())
}

/// Shows one of the caller's own results. Other students' results are 404.
pub async fn view_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(result_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = results::find_owned(&pool, result_id, claims.user_id()?)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    let quiz = quizzes::find_quiz(&pool, result.quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let performance = classify(result.score);

    Ok(Json(ResultView {
        result,
        quiz,
        performance,
    }))
}

pub async fn my_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let entries = results::list_for_student(&pool, claims.user_id()?).await?;
    Ok(Json(entries))
}

/// Correct answers and rationales, unlocked once the quiz has been taken.
pub async fn review_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id()?;
    let detail = quiz_detail(&pool, quiz_id).await?;

    let result = results::find_for_student_quiz(&pool, student_id, quiz_id)
        .await?
        .ok_or(AppError::Forbidden(
            "Submit the quiz before reviewing it".to_string(),
        ))?;

    let performance = classify(result.score);

    Ok(Json(json!({
        "result": result,
        "performance": performance,
        "quiz": detail,
    })))
}

/// Asks the AI collaborator why a question's correct option is correct.
pub async fn explain_question(
    State(pool): State<SqlitePool>,
    State(generator): State<Arc<dyn QuizGenerator>>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id()?;

    let question = quizzes::find_question(&pool, question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if results::find_for_student_quiz(&pool, student_id, question.quiz_id)
        .await?
        .is_none()
    {
        return Err(AppError::Forbidden(
            "Submit the quiz before asking for explanations".to_string(),
        ));
    }

    let correct = question.correct_option().ok_or(AppError::NotFound(
        "Question has no correct answer".to_string(),
    ))?;

    let explanation = generator.explain(&question.text, &correct.text).await?;

    Ok(Json(json!({
        "question_id": question.id,
        "correct_option_id": correct.id,
        "explanation": explanation,
    })))
}
