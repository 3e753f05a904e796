// src/handlers/teacher.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::DASHBOARD_PAGE_SIZE,
    error::AppError,
    generation::{GenerationRequest, QuizGenerator},
    models::{
        generation::{GenerateQuestionsRequest, GenerationResponse},
        question::{CreateQuestionRequest, NewQuestion},
        quiz::{CreateQuizRequest, DashboardParams, Quiz, SearchParams, TeacherDashboard},
    },
    store::{quizzes, results},
    utils::{html::clean_html, jwt::Claims},
};

/// Loads a quiz the caller owns, or 404.
async fn owned_quiz(pool: &SqlitePool, quiz_id: i64, claims: &Claims) -> Result<Quiz, AppError> {
    quizzes::find_owned_quiz(pool, quiz_id, claims.user_id()?)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

fn warn_if_unscoreable(question: &NewQuestion, quiz_id: i64) {
    if !question.options.iter().any(|o| o.is_correct) {
        tracing::warn!(
            "Question '{}' on quiz {} has no correct option; it can never be scored",
            question.text,
            quiz_id
        );
    }
}

/// Creates an empty quiz owned by the calling teacher.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let teacher_id = claims.user_id()?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO quizzes (title, subject, teacher_id, time_limit_minutes, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(clean_html(payload.title.trim()))
    .bind(clean_html(payload.subject.trim()))
    .bind(teacher_id)
    .bind(payload.time_limit_minutes)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!("Teacher {} created quiz {}", teacher_id, id);

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Teacher dashboard: own quizzes with question/result counts, 10 per page.
///
/// Out-of-range pages are clamped to the nearest valid page.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let teacher_id = claims.user_id()?;
    let totals = quizzes::teacher_totals(&pool, teacher_id).await?;

    let total_pages = ((totals.total_quizzes + DASHBOARD_PAGE_SIZE - 1) / DASHBOARD_PAGE_SIZE).max(1);
    let page = params.page.unwrap_or(1).clamp(1, total_pages);
    let offset = (page - 1) * DASHBOARD_PAGE_SIZE;

    let page_items = quizzes::teacher_page(&pool, teacher_id, DASHBOARD_PAGE_SIZE, offset).await?;

    Ok(Json(TeacherDashboard {
        quizzes: page_items,
        page,
        total_pages,
        total_quizzes: totals.total_quizzes,
        total_questions: totals.total_questions,
        total_results: totals.total_results,
    }))
}

/// Searches the caller's quizzes by title or subject.
pub async fn search_quizzes(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let found =
        quizzes::search_teacher_quizzes(&pool, claims.user_id()?, params.q.trim()).await?;
    Ok(Json(found))
}

/// Full quiz detail including correct answers and rationales.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = owned_quiz(&pool, quiz_id, &claims).await?;
    let detail = quizzes::load_detail(&pool, quiz).await?;
    Ok(Json(detail))
}

/// Deletes a quiz with its questions, options and results.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = owned_quiz(&pool, quiz_id, &claims).await?;

    sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(quiz.id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete quiz {}: {:?}", quiz.id, e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!("Deleted quiz {}", quiz.id);
    Ok(StatusCode::NO_CONTENT)
}

/// Adds one manually authored question to an owned quiz.
pub async fn add_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let quiz = owned_quiz(&pool, quiz_id, &claims).await?;

    let question = NewQuestion::from(payload);
    warn_if_unscoreable(&question, quiz.id);

    let ids = quizzes::insert_questions(&pool, quiz.id, std::slice::from_ref(&question)).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": ids[0] }))))
}

/// Replaces a question's text, rationale and options.
/// Results already recorded for the quiz are not re-scored.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let existing = quizzes::find_question(&pool, question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;
    let quiz = owned_quiz(&pool, existing.quiz_id, &claims).await?;

    let question = NewQuestion::from(payload);
    warn_if_unscoreable(&question, quiz.id);

    quizzes::replace_question(&pool, question_id, &question).await?;

    let updated = quizzes::find_question(&pool, question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;
    Ok(Json(updated))
}

/// Fills an owned quiz with AI-generated questions.
///
/// The generator's output is validated before anything is stored, and all
/// questions are inserted in one transaction.
pub async fn generate_questions(
    State(pool): State<SqlitePool>,
    State(generator): State<Arc<dyn QuizGenerator>>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<GenerateQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let quiz = owned_quiz(&pool, quiz_id, &claims).await?;

    let request = GenerationRequest {
        subject: quiz.subject.clone(),
        topic: payload.topic.trim().to_string(),
        question_count: payload.question_count,
        difficulty: payload.difficulty,
    };

    tracing::info!(
        "Generating {} questions for quiz {} via {}",
        request.question_count,
        quiz.id,
        generator.name()
    );

    let generated = generator.generate_questions(&request).await?;
    let questions: Vec<NewQuestion> = generated.into_iter().map(NewQuestion::from).collect();

    let question_ids = quizzes::insert_questions(&pool, quiz.id, &questions).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerationResponse {
            created: question_ids.len(),
            question_ids,
        }),
    ))
}

/// Lists every student's result on an owned quiz.
pub async fn quiz_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = owned_quiz(&pool, quiz_id, &claims).await?;
    let entries = results::list_for_quiz(&pool, quiz.id).await?;
    Ok(Json(entries))
}
