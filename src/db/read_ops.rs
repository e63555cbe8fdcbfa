use sqlx::SqlitePool;
use tracing::debug;

use crate::db::errors::{DatabaseError, Result};
use crate::models::student::{MarkRow, StudentRow};
use crate::validation::pagination::PageWindow;

/// Load a student by id, or `NotFound` if the id is unknown.
#[tracing::instrument(skip(pool), fields(student_id = %id))]
pub async fn load_student(pool: &SqlitePool, id: &str) -> Result<StudentRow> {
    debug!("Loading student");

    sqlx::query_as::<_, StudentRow>(
        r#"
        SELECT id, name, email, age, created_at, updated_at
        FROM students
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::QueryError)?
    .ok_or_else(|| DatabaseError::NotFound("Student not found".to_string()))
}

/// Fast-path uniqueness probe for create. The UNIQUE column constraint is
/// the actual guarantee; this only buys a friendly conflict response.
#[tracing::instrument(skip(pool, email))]
pub async fn find_student_by_email(pool: &SqlitePool, email: &str) -> Result<Option<StudentRow>> {
    sqlx::query_as::<_, StudentRow>(
        r#"
        SELECT id, name, email, age, created_at, updated_at
        FROM students
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::QueryError)
}

/// Load all marks owned by a student.
#[tracing::instrument(skip(pool), fields(student_id = %student_id))]
pub async fn load_marks(pool: &SqlitePool, student_id: &str) -> Result<Vec<MarkRow>> {
    sqlx::query_as::<_, MarkRow>(
        r#"
        SELECT id, student_id, subject, score
        FROM marks
        WHERE student_id = ?
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::QueryError)
}

/// List students, optionally restricted to a pagination window.
#[tracing::instrument(skip(pool))]
pub async fn list_students(pool: &SqlitePool, window: Option<PageWindow>) -> Result<Vec<StudentRow>> {
    debug!(windowed = window.is_some(), "Listing students");

    let records = match window {
        Some(window) => {
            sqlx::query_as::<_, StudentRow>(
                r#"
                SELECT id, name, email, age, created_at, updated_at
                FROM students
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, StudentRow>(
                r#"
                SELECT id, name, email, age, created_at, updated_at
                FROM students
                "#,
            )
            .fetch_all(pool)
            .await
        }
    }
    .map_err(DatabaseError::QueryError)?;

    Ok(records)
}

/// Total number of student records, independent of any window.
#[tracing::instrument(skip(pool))]
pub async fn count_students(pool: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::QueryError)
}
