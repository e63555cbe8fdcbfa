use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::student::{MarkRow, StudentRow};
use crate::scoring::to_display_score;

/// A mark as exposed by the API: score denormalized back to its 0-100
/// fractional display value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkResponse {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub score: f64,
}

impl From<MarkRow> for MarkResponse {
    fn from(row: MarkRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            subject: row.subject,
            score: to_display_score(row.score),
        }
    }
}

/// A student record with its marks, as exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub marks: Vec<MarkResponse>,
}

impl StudentResponse {
    pub fn from_rows(student: StudentRow, marks: Vec<MarkRow>) -> Self {
        Self {
            id: student.id,
            name: student.name,
            email: student.email,
            age: student.age,
            created_at: student.created_at,
            updated_at: student.updated_at,
            marks: marks.into_iter().map(MarkResponse::from).collect(),
        }
    }
}

/// Pagination metadata for list responses. `page` and `limit` echo the
/// requested values verbatim and are null when the listing was unwindowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct StudentEnvelope {
    pub status: &'static str,
    pub data: StudentResponse,
}

impl StudentEnvelope {
    pub fn new(data: StudentResponse) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudentListEnvelope {
    pub status: &'static str,
    pub data: Vec<StudentResponse>,
    pub meta: PageMeta,
}

impl StudentListEnvelope {
    pub fn new(data: Vec<StudentResponse>, meta: PageMeta) -> Self {
        Self {
            status: "success",
            data,
            meta,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedEnvelope {
    pub status: &'static str,
    pub message: &'static str,
}

impl DeletedEnvelope {
    pub fn new() -> Self {
        Self {
            status: "success",
            message: "Student deleted successfully",
        }
    }
}

impl Default for DeletedEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct EnvironmentInfo {
    pub name: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct HealthEnvelope {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub environment: EnvironmentInfo,
}
