use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::db::read_ops::{
    count_students, find_student_by_email, list_students, load_marks, load_student,
};
use crate::db::write_ops::{
    delete_marks, delete_student, insert_marks, insert_student, update_student_fields,
};
use crate::models::api::{DeletedEnvelope, StudentEnvelope, StudentListEnvelope, StudentResponse};
use crate::models::student::{NewMark, NewStudent};
use crate::scoring::to_stored_units;
use crate::validation::pagination::PaginationQuery;
use crate::validation::student::MarkPayload;
use crate::validation::{validate_pagination, validate_register, validate_update};

fn normalize_marks(marks: &[MarkPayload]) -> Vec<NewMark> {
    marks
        .iter()
        .map(|mark| NewMark {
            subject: mark.subject,
            score: to_stored_units(mark.score),
        })
        .collect()
}

#[tracing::instrument(skip(pool, body))]
pub async fn create_student_handler(
    State(pool): State<SqlitePool>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StudentEnvelope>)> {
    let Json(body) = body.map_err(|_| ApiError::MalformedBody)?;

    let payload = validate_register(&body).map_err(|errors| ApiError::Validation {
        context: "Invalid registration data",
        errors,
    })?;

    // Fast-path only; the UNIQUE constraint is the actual guarantee and a
    // racing insert still surfaces as the same conflict.
    if find_student_by_email(&pool, &payload.email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let new_marks = normalize_marks(&payload.marks);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| ApiError::Database(format!("Failed to start transaction: {}", e)))?;

    let student = insert_student(
        &mut tx,
        &NewStudent {
            name: payload.name,
            email: payload.email,
            age: payload.age,
        },
    )
    .await?;
    let marks = insert_marks(&mut tx, &student.id, &new_marks).await?;

    tx.commit()
        .await
        .map_err(|e| ApiError::Database(format!("Failed to commit transaction: {}", e)))?;

    info!(student_id = %student.id, "Created student");

    Ok((
        StatusCode::CREATED,
        Json(StudentEnvelope::new(StudentResponse::from_rows(
            student, marks,
        ))),
    ))
}

#[tracing::instrument(skip(pool, body), fields(student_id = %id))]
pub async fn update_student_handler(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<StudentEnvelope>> {
    let Json(body) = body.map_err(|_| ApiError::MalformedBody)?;

    let payload = validate_update(&body).map_err(|errors| ApiError::Validation {
        context: "Invalid registration data",
        errors,
    })?;

    let existing = load_student(&pool, &id).await?;

    if let Some(email) = payload.email.as_deref() {
        if email != existing.email {
            return Err(ApiError::EmailChange);
        }
    }

    let new_marks = payload.marks.as_deref().map(normalize_marks);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| ApiError::Database(format!("Failed to start transaction: {}", e)))?;

    update_student_fields(&mut tx, &id, payload.name.as_deref(), payload.age, Utc::now()).await?;

    // Supplying marks replaces the whole collection, never merges.
    if let Some(marks) = &new_marks {
        delete_marks(&mut tx, &id).await?;
        insert_marks(&mut tx, &id, marks).await?;
    }

    tx.commit()
        .await
        .map_err(|e| ApiError::Database(format!("Failed to commit transaction: {}", e)))?;

    info!("Updated student");

    let student = load_student(&pool, &id).await?;
    let marks = load_marks(&pool, &id).await?;

    Ok(Json(StudentEnvelope::new(StudentResponse::from_rows(
        student, marks,
    ))))
}

#[tracing::instrument(skip(pool, query))]
pub async fn list_students_handler(
    State(pool): State<SqlitePool>,
    Query(query): Query<PaginationQuery>,
) -> ApiResult<Json<StudentListEnvelope>> {
    let params = validate_pagination(&query).map_err(|errors| ApiError::Validation {
        context: "Invalid query parameters",
        errors,
    })?;

    let (students, total) = tokio::try_join!(
        list_students(&pool, params.window()),
        count_students(&pool)
    )?;

    if students.is_empty() {
        return Err(ApiError::NotFound("No students found".to_string()));
    }

    let mut data = Vec::with_capacity(students.len());
    for student in students {
        let marks = load_marks(&pool, &student.id).await?;
        data.push(StudentResponse::from_rows(student, marks));
    }

    info!(returned = data.len(), total = total, "Listed students");

    Ok(Json(StudentListEnvelope::new(data, params.meta(total))))
}

#[tracing::instrument(skip(pool), fields(student_id = %id))]
pub async fn get_student_handler(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> ApiResult<Json<StudentEnvelope>> {
    let student = load_student(&pool, &id).await?;
    let marks = load_marks(&pool, &id).await?;

    Ok(Json(StudentEnvelope::new(StudentResponse::from_rows(
        student, marks,
    ))))
}

#[tracing::instrument(skip(pool), fields(student_id = %id))]
pub async fn delete_student_handler(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedEnvelope>> {
    load_student(&pool, &id).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| ApiError::Database(format!("Failed to start transaction: {}", e)))?;

    delete_marks(&mut tx, &id).await?;
    delete_student(&mut tx, &id).await?;

    tx.commit()
        .await
        .map_err(|e| ApiError::Database(format!("Failed to commit transaction: {}", e)))?;

    info!("Deleted student");

    Ok(Json(DeletedEnvelope::new()))
}
