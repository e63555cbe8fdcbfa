use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::errors::{DatabaseError, Result};
use crate::models::student::{MarkRow, NewMark, NewStudent, StudentRow};

/// Insert a student record, generating its id and timestamps. A duplicate
/// email surfaces as `UniqueViolation` from the column constraint.
#[tracing::instrument(skip(tx, student), fields(email = %student.email))]
pub async fn insert_student(
    tx: &mut Transaction<'_, Sqlite>,
    student: &NewStudent,
) -> Result<StudentRow> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    debug!(student_id = %id, "Inserting student");

    sqlx::query(
        r#"
        INSERT INTO students (id, name, email, age, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&student.name)
    .bind(&student.email)
    .bind(student.age)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    info!(student_id = %id, "Inserted student");

    Ok(StudentRow {
        id,
        name: student.name.clone(),
        email: student.email.clone(),
        age: student.age,
        created_at: now,
        updated_at: now,
    })
}

/// Insert marks for a student. Scores arrive already normalized to stored
/// units.
#[tracing::instrument(skip(tx, marks), fields(student_id = %student_id, count = marks.len()))]
pub async fn insert_marks(
    tx: &mut Transaction<'_, Sqlite>,
    student_id: &str,
    marks: &[NewMark],
) -> Result<Vec<MarkRow>> {
    let mut rows = Vec::with_capacity(marks.len());

    for mark in marks {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO marks (id, student_id, subject, score)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(student_id)
        .bind(mark.subject.as_str())
        .bind(mark.score)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        rows.push(MarkRow {
            id,
            student_id: student_id.to_string(),
            subject: mark.subject.as_str().to_string(),
            score: mark.score,
        });
    }

    info!(inserted = rows.len(), "Inserted marks");
    Ok(rows)
}

/// Apply the scalar field updates of a partial student update. Absent
/// fields keep their stored values.
#[tracing::instrument(skip(tx, name, age), fields(student_id = %id))]
pub async fn update_student_fields(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    name: Option<&str>,
    age: Option<i64>,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE students
        SET name = COALESCE(?, name),
            age = COALESCE(?, age),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(age)
    .bind(updated_at)
    .bind(id)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    Ok(())
}

/// Delete all marks owned by a student. Used both by the full-replace update
/// path and by delete.
#[tracing::instrument(skip(tx), fields(student_id = %student_id))]
pub async fn delete_marks(tx: &mut Transaction<'_, Sqlite>, student_id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM marks WHERE student_id = ?")
        .bind(student_id)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::QueryError)?;

    let deleted = result.rows_affected();
    debug!(deleted = deleted, "Deleted marks");
    Ok(deleted)
}

/// Delete a student record.
#[tracing::instrument(skip(tx), fields(student_id = %id))]
pub async fn delete_student(tx: &mut Transaction<'_, Sqlite>, id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::QueryError)?;

    let deleted = result.rows_affected();
    info!(deleted = deleted, "Deleted student");
    Ok(deleted)
}
