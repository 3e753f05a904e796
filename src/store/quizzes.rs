// src/store/quizzes.rs

use std::collections::HashMap;

use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::models::{
    question::{AnswerOption, NewQuestion, Question, QuestionRow},
    quiz::{Quiz, QuizDetail, QuizSummary},
};

const QUIZ_COLUMNS: &str = "id, title, subject, teacher_id, time_limit_minutes, created_at";

const SUMMARY_SELECT: &str = r#"
    SELECT
        q.id,
        q.title,
        q.subject,
        q.time_limit_minutes,
        q.created_at,
        (SELECT COUNT(*) FROM questions qs WHERE qs.quiz_id = q.id) AS question_count,
        (SELECT COUNT(*) FROM results r WHERE r.quiz_id = q.id) AS result_count
    FROM quizzes q
"#;

/// Aggregate counts over every quiz a teacher owns.
#[derive(Debug, FromRow)]
pub struct TeacherTotals {
    pub total_quizzes: i64,
    pub total_questions: i64,
    pub total_results: i64,
}

pub async fn find_quiz(pool: &SqlitePool, quiz_id: i64) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?"))
        .bind(quiz_id)
        .fetch_optional(pool)
        .await
}

/// Loads a quiz owned by `teacher_id`; other teachers' quizzes look absent.
pub async fn find_owned_quiz(
    pool: &SqlitePool,
    quiz_id: i64,
    teacher_id: i64,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ? AND teacher_id = ?"
    ))
    .bind(quiz_id)
    .bind(teacher_id)
    .fetch_optional(pool)
    .await
}

/// Attaches questions and their options to a quiz, in authoring order.
pub async fn load_detail(pool: &SqlitePool, quiz: Quiz) -> Result<QuizDetail, sqlx::Error> {
    let rows = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, quiz_id, text, rationale FROM questions WHERE quiz_id = ? ORDER BY id",
    )
    .bind(quiz.id)
    .fetch_all(pool)
    .await?;

    let options = sqlx::query_as::<_, AnswerOption>(
        r#"
        SELECT o.id, o.question_id, o.text, o.is_correct, o.position
        FROM options o
        JOIN questions qs ON o.question_id = qs.id
        WHERE qs.quiz_id = ?
        ORDER BY o.question_id, o.position
        "#,
    )
    .bind(quiz.id)
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<AnswerOption>> = HashMap::new();
    for option in options {
        by_question.entry(option.question_id).or_default().push(option);
    }

    let questions = rows
        .into_iter()
        .map(|row| {
            let options = by_question.remove(&row.id).unwrap_or_default();
            Question::from_row(row, options)
        })
        .collect();

    Ok(QuizDetail { quiz, questions })
}

pub async fn find_detail(
    pool: &SqlitePool,
    quiz_id: i64,
) -> Result<Option<QuizDetail>, sqlx::Error> {
    match find_quiz(pool, quiz_id).await? {
        Some(quiz) => Ok(Some(load_detail(pool, quiz).await?)),
        None => Ok(None),
    }
}

/// Loads one question with its options.
pub async fn find_question(
    pool: &SqlitePool,
    question_id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    let Some(row) = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, quiz_id, text, rationale FROM questions WHERE id = ?",
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let options = sqlx::query_as::<_, AnswerOption>(
        "SELECT id, question_id, text, is_correct, position FROM options WHERE question_id = ? ORDER BY position",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(Question::from_row(row, options)))
}

async fn insert_options(
    conn: &mut SqliteConnection,
    question_id: i64,
    question: &NewQuestion,
) -> Result<(), sqlx::Error> {
    for (position, option) in question.options.iter().enumerate() {
        sqlx::query(
            "INSERT INTO options (question_id, text, is_correct, position) VALUES (?, ?, ?, ?)",
        )
        .bind(question_id)
        .bind(&option.text)
        .bind(option.is_correct)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Appends questions to a quiz atomically; either all are stored or none.
pub async fn insert_questions(
    pool: &SqlitePool,
    quiz_id: i64,
    questions: &[NewQuestion],
) -> Result<Vec<i64>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(questions.len());

    for question in questions {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO questions (quiz_id, text, rationale, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(quiz_id)
        .bind(&question.text)
        .bind(&question.rationale)
        .bind(chrono::Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        insert_options(&mut tx, id, question).await?;
        ids.push(id);
    }

    tx.commit().await?;
    Ok(ids)
}

/// Replaces a question's text, rationale and full option set.
pub async fn replace_question(
    pool: &SqlitePool,
    question_id: i64,
    question: &NewQuestion,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE questions SET text = ?, rationale = ? WHERE id = ?")
        .bind(&question.text)
        .bind(&question.rationale)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM options WHERE question_id = ?")
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    insert_options(&mut tx, question_id, question).await?;

    tx.commit().await?;
    Ok(())
}

pub async fn teacher_page(
    pool: &SqlitePool,
    teacher_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<QuizSummary>, sqlx::Error> {
    sqlx::query_as::<_, QuizSummary>(&format!(
        "{SUMMARY_SELECT} WHERE q.teacher_id = ? ORDER BY q.id DESC LIMIT ? OFFSET ?"
    ))
    .bind(teacher_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn teacher_totals(
    pool: &SqlitePool,
    teacher_id: i64,
) -> Result<TeacherTotals, sqlx::Error> {
    sqlx::query_as::<_, TeacherTotals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM quizzes WHERE teacher_id = ?) AS total_quizzes,
            (SELECT COUNT(*) FROM questions qs
                JOIN quizzes q ON qs.quiz_id = q.id
                WHERE q.teacher_id = ?) AS total_questions,
            (SELECT COUNT(*) FROM results r
                JOIN quizzes q ON r.quiz_id = q.id
                WHERE q.teacher_id = ?) AS total_results
        "#,
    )
    .bind(teacher_id)
    .bind(teacher_id)
    .bind(teacher_id)
    .fetch_one(pool)
    .await
}

/// Case-insensitive substring search over a teacher's quiz titles and subjects.
pub async fn search_teacher_quizzes(
    pool: &SqlitePool,
    teacher_id: i64,
    term: &str,
) -> Result<Vec<QuizSummary>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(term));

    sqlx::query_as::<_, QuizSummary>(&format!(
        r#"{SUMMARY_SELECT}
        WHERE q.teacher_id = ?
          AND (q.title LIKE ? ESCAPE '\' OR q.subject LIKE ? ESCAPE '\')
        ORDER BY q.id DESC"#
    ))
    .bind(teacher_id)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(pool)
    .await
}

pub async fn all_summaries(pool: &SqlitePool) -> Result<Vec<QuizSummary>, sqlx::Error> {
    sqlx::query_as::<_, QuizSummary>(&format!("{SUMMARY_SELECT} ORDER BY q.id DESC"))
        .fetch_all(pool)
        .await
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
