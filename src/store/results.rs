// src/store/results.rs

use sqlx::SqlitePool;

use crate::models::result::{QuizResult, QuizResultEntry, StudentResultEntry};

const RESULT_COLUMNS: &str = "id, student_id, quiz_id, score, completed_on";

/// Outcome of [`record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    /// A new result row was written.
    Created(QuizResult),
    /// A result already existed for the (student, quiz) pair; it is returned untouched.
    Existing(QuizResult),
}

impl Recorded {
    pub fn result(&self) -> &QuizResult {
        match self {
            Recorded::Created(r) | Recorded::Existing(r) => r,
        }
    }
}

pub async fn find_for_student_quiz(
    pool: &SqlitePool,
    student_id: i64,
    quiz_id: i64,
) -> Result<Option<QuizResult>, sqlx::Error> {
    sqlx::query_as::<_, QuizResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results WHERE student_id = ? AND quiz_id = ?"
    ))
    .bind(student_id)
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
}

/// Writes the one result a student gets for a quiz.
///
/// The completion timestamp is taken here. The `UNIQUE(student_id, quiz_id)`
/// constraint makes a concurrent second insert a no-op, after which the row
/// that won is returned as [`Recorded::Existing`].
pub async fn record(
    pool: &SqlitePool,
    student_id: i64,
    quiz_id: i64,
    percentage: f64,
) -> Result<Recorded, sqlx::Error> {
    let inserted = sqlx::query_as::<_, QuizResult>(&format!(
        r#"
        INSERT INTO results (student_id, quiz_id, score, completed_on)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (student_id, quiz_id) DO NOTHING
        RETURNING {RESULT_COLUMNS}
        "#
    ))
    .bind(student_id)
    .bind(quiz_id)
    .bind(percentage)
    .bind(chrono::Utc::now())
    .fetch_optional(pool)
    .await?;

    if let Some(result) = inserted {
        return Ok(Recorded::Created(result));
    }

    let existing = find_for_student_quiz(pool, student_id, quiz_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(Recorded::Existing(existing))
}

/// Loads a result only if it belongs to `student_id`.
pub async fn find_owned(
    pool: &SqlitePool,
    result_id: i64,
    student_id: i64,
) -> Result<Option<QuizResult>, sqlx::Error> {
    sqlx::query_as::<_, QuizResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results WHERE id = ? AND student_id = ?"
    ))
    .bind(result_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_for_student(
    pool: &SqlitePool,
    student_id: i64,
) -> Result<Vec<StudentResultEntry>, sqlx::Error> {
    sqlx::query_as::<_, StudentResultEntry>(
        r#"
        SELECT r.id, r.quiz_id, q.title AS quiz_title, r.score, r.completed_on
        FROM results r
        JOIN quizzes q ON r.quiz_id = q.id
        WHERE r.student_id = ?
        ORDER BY r.completed_on DESC
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub async fn list_for_quiz(
    pool: &SqlitePool,
    quiz_id: i64,
) -> Result<Vec<QuizResultEntry>, sqlx::Error> {
    sqlx::query_as::<_, QuizResultEntry>(
        r#"
        SELECT r.id, r.student_id, u.username, r.score, r.completed_on
        FROM results r
        JOIN users u ON r.student_id = u.id
        WHERE r.quiz_id = ?
        ORDER BY r.score DESC, r.completed_on
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

pub async fn taken_quiz_ids(pool: &SqlitePool, student_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT quiz_id FROM results WHERE student_id = ? ORDER BY quiz_id")
        .bind(student_id)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support;

    #[tokio::test]
    async fn second_record_returns_existing_result() {
        let pool = test_support::pool().await;
        let teacher = test_support::user(&pool, "teach", "teacher").await;
        let student = test_support::user(&pool, "stud", "student").await;
        let quiz = test_support::quiz(&pool, teacher, "Algebra", "Maths").await;

        let first = record(&pool, student, quiz, 75.0).await.unwrap();
        let Recorded::Created(created) = first else {
            panic!("expected a new result");
        };
        assert_eq!(created.score, 75.0);

        let second = record(&pool, student, quiz, 10.0).await.unwrap();
        assert_eq!(second, Recorded::Existing(created.clone()));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM results")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn results_are_scoped_to_their_student() {
        let pool = test_support::pool().await;
        let teacher = test_support::user(&pool, "teach", "teacher").await;
        let alice = test_support::user(&pool, "alice", "student").await;
        let bob = test_support::user(&pool, "bob", "student").await;
        let quiz = test_support::quiz(&pool, teacher, "Cells", "Biology").await;

        let recorded = record(&pool, alice, quiz, 50.0).await.unwrap();
        let id = recorded.result().id;

        assert!(find_owned(&pool, id, alice).await.unwrap().is_some());
        assert!(find_owned(&pool, id, bob).await.unwrap().is_none());
        assert_eq!(taken_quiz_ids(&pool, alice).await.unwrap(), vec![quiz]);
        assert!(taken_quiz_ids(&pool, bob).await.unwrap().is_empty());

        let entries = list_for_quiz(&pool, quiz).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].username, "alice");

        let mine = list_for_student(&pool, alice).await.unwrap();
        assert_eq!(mine[0].quiz_title, "Cells");
    }
}
