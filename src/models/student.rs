use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The fixed set of subjects a mark can be recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Science,
    English,
    #[serde(rename = "Social_Studies")]
    SocialStudies,
    Art,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::Math,
        Subject::Science,
        Subject::English,
        Subject::SocialStudies,
        Subject::Art,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::English => "English",
            Subject::SocialStudies => "Social_Studies",
            Subject::Art => "Art",
        }
    }

    pub fn parse(value: &str) -> Option<Subject> {
        Subject::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

/// `students` table row.
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `marks` table row. `score` is in stored units (hundredths of a point).
#[derive(Debug, Clone, FromRow)]
pub struct MarkRow {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub score: i64,
}

/// Fields for a student insert; ids and timestamps are generated at write time.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// Fields for a mark insert. `score` is already normalized to stored units.
#[derive(Debug, Clone)]
pub struct NewMark {
    pub subject: Subject,
    pub score: i64,
}
